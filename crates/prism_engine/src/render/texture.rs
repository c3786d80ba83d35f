//! 2D texture resources

use crate::render::api::{RenderBackend, TextureFilter, TextureFormat, TextureId, TextureSpec};
use crate::render::{RenderError, RenderResult};
use std::path::Path;

/// A sampled 2D texture
///
/// Equality is identity: two `Texture2D` values are the same texture exactly
/// when their backend handles match, which is what the slot table's
/// deduplication relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture2D {
    id: TextureId,
    width: u32,
    height: u32,
}

impl Texture2D {
    /// Create a texture from raw RGBA8 texels
    pub fn from_rgba8(
        backend: &mut dyn RenderBackend,
        width: u32,
        height: u32,
        texels: &[u8],
    ) -> RenderResult<Self> {
        debug_assert_eq!(
            texels.len(),
            (width * height * 4) as usize,
            "texel payload does not match {width}x{height} RGBA8"
        );
        let id = backend.create_texture(
            &TextureSpec {
                width,
                height,
                format: TextureFormat::Rgba8,
                filter: TextureFilter::Linear,
                repeat: true,
            },
            Some(texels),
        )?;
        Ok(Self { id, width, height })
    }

    /// Decode a PNG from disk and upload it
    pub fn from_file(backend: &mut dyn RenderBackend, path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let decoded = image::open(path)
            .map_err(|e| {
                RenderError::ResourceAllocation(format!(
                    "failed to decode texture '{}': {e}",
                    path.display()
                ))
            })?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        Self::from_rgba8(backend, width, height, decoded.as_raw())
    }

    /// The permanently-bound 1x1 opaque white fallback for slot 0
    pub fn white(backend: &mut dyn RenderBackend) -> RenderResult<Self> {
        Self::from_rgba8(backend, 1, 1, &[0xff, 0xff, 0xff, 0xff])
    }

    /// Backend handle
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Width in texels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Opaque native handle for UI image display
    pub fn native_handle(&self, backend: &dyn RenderBackend) -> u64 {
        backend.texture_native_handle(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    #[test]
    fn white_texture_is_one_by_one() {
        let mut backend = HeadlessBackend::new();
        let white = Texture2D::white(&mut backend).unwrap();
        assert_eq!(white.width(), 1);
        assert_eq!(white.height(), 1);
    }

    #[test]
    fn textures_compare_by_identity() {
        let mut backend = HeadlessBackend::new();
        let a = Texture2D::white(&mut backend).unwrap();
        let b = Texture2D::white(&mut backend).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, a);
    }
}
