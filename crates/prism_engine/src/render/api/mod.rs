//! Backend-agnostic rendering API
//!
//! Everything above this module (batching, framebuffers, the pass pipeline)
//! talks to the GPU exclusively through [`RenderBackend`]; concrete backends
//! live in [`crate::render::backends`].

mod backend;

pub use backend::{
    BufferId, BufferKind, ClearFlags, CompareFunc, CullFace, FramebufferId, PolygonMode,
    RenderBackend, ShaderId, TextureFilter, TextureFormat, TextureId, TextureSpec,
    VertexArrayId, VertexAttributeFormat, VertexLayout,
};
