//! # Prism Engine
//!
//! A batched, deferred-shading 3D renderer with a backend-agnostic core.
//!
//! ## Features
//!
//! - **Batched submission**: quads, circles, lines, and meshes accumulate in
//!   host staging and flush in bounded GPU batches
//! - **Deferred pipeline**: geometry pass into a multi-attachment G-buffer,
//!   SSAO, PBR lighting composite, bloom, and a post-processing chain
//! - **Backend abstraction**: the core contains zero backend-specific code;
//!   OpenGL and a headless recording backend ship in this build
//! - **Editor integration**: entity-id picking attachment, per-buffer
//!   viewport display, and draw statistics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prism_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let backend = prism_engine::render::backends::select(BackendKind::Headless)?;
//!     let mut renderer = Renderer::new(backend, &config.renderer)?;
//!
//!     let camera = EditorCamera::default();
//!     renderer.begin_render_pass();
//!     renderer.begin_scene_editor(&camera, &[]);
//!     renderer.draw_quad(&Mat4::identity(), Vec4::new(1.0, 0.2, 0.2, 1.0), -1);
//!     renderer.end_scene();
//!     renderer.ssao_pass();
//!     renderer.deferred_lighting_pass();
//!     renderer.begin_post_processing();
//!     renderer.apply_bloom();
//!     renderer.end_post_processing();
//!     renderer.end_render_pass();
//!     println!("{:?}", renderer.stats());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod render;
pub mod scene;

pub use config::{BackendKind, ConfigError, ConfigResult, EngineConfig, RendererConfig};
pub use render::{RenderError, RenderResult};

/// Common imports for engine users
pub mod prelude {
    pub use crate::config::{BackendKind, EngineConfig, RendererConfig};
    pub use crate::foundation::math::{Mat4, Quat, Transform, Vec2, Vec3, Vec4};
    pub use crate::render::{
        camera::{EditorCamera, SceneCamera},
        mesh::{Mesh, MeshMaterial},
        pipeline::{DisplayBuffer, PostEffect, PostEffectParams, Renderer, RenderSettings},
        skybox::Skybox,
        texture::Texture2D,
        GpuLight, RenderError, RenderResult, RenderStats,
    };
    pub use crate::scene::{
        collect_lights, CameraComponent, LightComponent, LightKind, MeshComponent,
        OutlineComponent, PostProcessComponent, SpriteComponent, TransformComponent,
    };
}
