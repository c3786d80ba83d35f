//! # Rendering System
//!
//! The core rendering abstraction layer: a batched, deferred-shading
//! multi-pass renderer behind a backend-agnostic GPU interface.
//!
//! ## Architecture
//!
//! - **api**: the [`RenderBackend`] contract everything above depends on
//! - **backends**: concrete backend implementations (OpenGL, headless)
//! - **buffer / texture / framebuffer / shader**: GPU resource wrappers
//! - **batch**: per-family vertex accumulation with implicit flush-on-overflow
//! - **pipeline**: the per-frame pass orchestration ([`Renderer`])
//!
//! ## Error policy
//!
//! Initialization-time failures (backend selection, shader link, framebuffer
//! completeness) surface as [`RenderError`] and abort startup. The per-frame
//! API never returns an error object upward; per-frame contracts are debug
//! assertions, and the only soft failure is a logged no-op resize.

pub mod api;
pub mod backends;
pub mod batch;
pub mod buffer;
pub mod camera;
pub mod framebuffer;
pub mod lighting;
pub mod mesh;
pub mod pipeline;
pub mod shader;
pub mod skybox;
pub mod texture;
pub mod uniforms;

#[cfg(test)]
mod renderer_tests;

pub use api::{
    BufferId, BufferKind, ClearFlags, CompareFunc, CullFace, FramebufferId, PolygonMode,
    RenderBackend, ShaderId, TextureFilter, TextureFormat, TextureId, TextureSpec, VertexArrayId,
    VertexAttributeFormat, VertexLayout,
};
pub use batch::{RenderStats, SlotAssignment, TextureSlotTable};
pub use buffer::{IndexBuffer, StorageBuffer, UniformBuffer, VertexBuffer};
pub use camera::{CameraMatrices, EditorCamera, SceneCamera};
pub use framebuffer::{Framebuffer, FramebufferSpec};
pub use lighting::GpuLight;
pub use mesh::{Mesh, MeshMaterial, MeshVertexData};
pub use pipeline::{
    DisplayBuffer, PostEffect, PostEffectParams, Renderer, RenderSettings,
};
pub use skybox::Skybox;
pub use texture::Texture2D;

use crate::config::BackendKind;
use thiserror::Error;

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during renderer initialization and resource creation
#[derive(Debug, Error)]
pub enum RenderError {
    /// The configured backend is not implemented in this build
    #[error("unsupported rendering backend selected: {0:?}")]
    UnsupportedBackend(BackendKind),

    /// The backend could not be brought up
    #[error("renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// A GPU resource allocation was rejected by the driver
    #[error("GPU resource allocation failed: {0}")]
    ResourceAllocation(String),

    /// A shader failed to compile or link
    #[error("shader '{name}' failed to build: {log}")]
    ShaderBuild {
        /// Program name as registered with the backend
        name: String,
        /// Compiler or linker output
        log: String,
    },

    /// A framebuffer was incomplete after (re)creation
    #[error("framebuffer incomplete: {0}")]
    FramebufferIncomplete(String),
}
