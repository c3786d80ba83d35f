//! Graphics backend implementations
//!
//! Contains the concrete [`RenderBackend`](crate::render::api::RenderBackend)
//! implementations. Backend selection happens once at startup from
//! [`BackendKind`]; selecting a backend this build does not implement is a
//! fatal configuration error.

pub mod gl;
pub mod headless;

pub use gl::GlBackend;
pub use headless::HeadlessBackend;

use crate::config::BackendKind;
use crate::render::{api::RenderBackend, RenderError, RenderResult};

/// Construct the backend selected by configuration
///
/// The OpenGL backend cannot be constructed here because it needs a context
/// loader from the windowing layer; use [`GlBackend::from_loader`] and hand
/// the result to [`Renderer::new`](crate::render::pipeline::Renderer::new)
/// directly. Selecting Vulkan aborts startup: it is a valid configuration
/// value but not implemented in this build.
pub fn select(kind: BackendKind) -> RenderResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Headless => Ok(Box::new(HeadlessBackend::new())),
        BackendKind::Vulkan => Err(RenderError::UnsupportedBackend(kind)),
        BackendKind::OpenGl => Err(RenderError::InitializationFailed(
            "the OpenGL backend needs a context loader; construct it with GlBackend::from_loader"
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_is_selectable() {
        let backend = select(BackendKind::Headless).expect("headless backend");
        assert_eq!(backend.name(), "headless");
    }

    #[test]
    fn vulkan_selection_is_fatal() {
        let err = select(BackendKind::Vulkan).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedBackend(BackendKind::Vulkan)));
    }
}
