//! Skybox environment resources

use crate::render::api::{RenderBackend, TextureFilter, TextureFormat, TextureId, TextureSpec};
use crate::render::RenderResult;

/// A cubemap environment with the derived maps image-based lighting samples
///
/// Irradiance and pre-filtered specular convolution belong to the asset
/// pipeline; when prebuilt maps are not supplied both fall back to the base
/// cubemap, which keeps the deferred shader free of feature branches.
#[derive(Debug, Clone, Copy)]
pub struct Skybox {
    cubemap: TextureId,
    irradiance: TextureId,
    prefiltered: TextureId,
}

impl Skybox {
    /// Create a skybox from six face images in +X, -X, +Y, -Y, +Z, -Z order,
    /// each `face_size` x `face_size` RGBA8
    pub fn from_faces(
        backend: &mut dyn RenderBackend,
        face_size: u32,
        faces: &[&[u8]; 6],
    ) -> RenderResult<Self> {
        let cubemap = backend.create_cubemap(
            &TextureSpec {
                width: face_size,
                height: face_size,
                format: TextureFormat::Rgba8,
                filter: TextureFilter::Linear,
                repeat: false,
            },
            Some(faces),
        )?;
        Ok(Self {
            cubemap,
            irradiance: cubemap,
            prefiltered: cubemap,
        })
    }

    /// Create a skybox with prebuilt irradiance and pre-filtered maps
    pub fn with_environment_maps(
        cubemap: TextureId,
        irradiance: TextureId,
        prefiltered: TextureId,
    ) -> Self {
        Self {
            cubemap,
            irradiance,
            prefiltered,
        }
    }

    /// A uniform single-color environment, useful as a default and in tests
    pub fn solid_color(backend: &mut dyn RenderBackend, rgba: [u8; 4]) -> RenderResult<Self> {
        let face: [u8; 4] = rgba;
        Self::from_faces(backend, 1, &[&face, &face, &face, &face, &face, &face])
    }

    /// The base cubemap sampled by the skybox pass
    pub fn cubemap(&self) -> TextureId {
        self.cubemap
    }

    /// Diffuse irradiance map for ambient IBL
    pub fn irradiance(&self) -> TextureId {
        self.irradiance
    }

    /// Pre-filtered specular map for glossy IBL
    pub fn prefiltered(&self) -> TextureId {
        self.prefiltered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    #[test]
    fn environment_maps_fall_back_to_the_base_cubemap() {
        let mut backend = HeadlessBackend::new();
        let skybox = Skybox::solid_color(&mut backend, [20, 30, 60, 255]).unwrap();
        assert_eq!(skybox.cubemap(), skybox.irradiance());
        assert_eq!(skybox.cubemap(), skybox.prefiltered());
    }
}
