//! Built-in shader programs
//!
//! All shader sources ship embedded in the binary; the shader
//! compilation/reflection tooling that produced them is outside this crate.
//! Link failure for any program is a fatal asset-authoring error surfaced
//! during renderer construction.

use crate::render::api::{RenderBackend, ShaderId};
use crate::render::RenderResult;

/// Embedded GLSL sources for every built-in program
pub mod sources {
    /// Batched quad vertex stage
    pub const QUAD_VERT: &str = include_str!("shaders/quad.vert");
    /// Batched quad G-buffer writer
    pub const QUAD_FRAG: &str = include_str!("shaders/quad.frag");
    /// Batched circle vertex stage
    pub const CIRCLE_VERT: &str = include_str!("shaders/circle.vert");
    /// Circle signed-distance G-buffer writer
    pub const CIRCLE_FRAG: &str = include_str!("shaders/circle.frag");
    /// Line vertex stage (also used by mesh outlines)
    pub const LINE_VERT: &str = include_str!("shaders/line.vert");
    /// Flat-color G-buffer writer
    pub const LINE_FRAG: &str = include_str!("shaders/line.frag");
    /// Batched mesh vertex stage
    pub const MESH_VERT: &str = include_str!("shaders/mesh.vert");
    /// Mesh G-buffer writer
    pub const MESH_FRAG: &str = include_str!("shaders/mesh.frag");
    /// Skybox vertex stage
    pub const SKYBOX_VERT: &str = include_str!("shaders/skybox.vert");
    /// Skybox background writer
    pub const SKYBOX_FRAG: &str = include_str!("shaders/skybox.frag");
    /// Shared full-screen-quad vertex stage
    pub const FULLSCREEN_VERT: &str = include_str!("shaders/fullscreen.vert");
    /// Deferred PBR lighting composite
    pub const DEFERRED_FRAG: &str = include_str!("shaders/deferred.frag");
    /// Screen-space ambient occlusion
    pub const SSAO_FRAG: &str = include_str!("shaders/ssao.frag");
    /// SSAO 4x4 box blur
    pub const SSAO_BLUR_FRAG: &str = include_str!("shaders/ssao_blur.frag");
    /// Separable Gaussian blur toggled between directions
    pub const GAUSSIAN_BLUR_FRAG: &str = include_str!("shaders/gaussian_blur.frag");
    /// Additive blend of two sources (bloom composite)
    pub const ADDITIVE_FRAG: &str = include_str!("shaders/additive.frag");
    /// Exposure tone-mapping
    pub const TONEMAP_FRAG: &str = include_str!("shaders/tonemap.frag");
    /// Gamma correction
    pub const GAMMA_FRAG: &str = include_str!("shaders/gamma.frag");
    /// Color inversion
    pub const INVERSION_FRAG: &str = include_str!("shaders/inversion.frag");
    /// Luminance greyscale
    pub const GREYSCALE_FRAG: &str = include_str!("shaders/greyscale.frag");
    /// Sharpen kernel
    pub const SHARPEN_FRAG: &str = include_str!("shaders/sharpen.frag");
    /// Box blur kernel
    pub const BOX_BLUR_FRAG: &str = include_str!("shaders/box_blur.frag");
    /// Edge-detection kernel
    pub const EDGE_DETECTION_FRAG: &str = include_str!("shaders/edge_detection.frag");
    /// BRDF integration for the IBL lookup texture
    pub const BRDF_LUT_FRAG: &str = include_str!("shaders/brdf_lut.frag");
}

/// Every linked program the renderer uses, built once at startup
#[derive(Debug)]
pub struct ShaderSet {
    /// Quad family geometry program
    pub quad: ShaderId,
    /// Circle family geometry program
    pub circle: ShaderId,
    /// Line family geometry program
    pub line: ShaderId,
    /// Mesh family geometry program
    pub mesh: ShaderId,
    /// Mesh outline program (line layout, wireframe draw state)
    pub outline: ShaderId,
    /// Skybox background program
    pub skybox: ShaderId,
    /// Deferred lighting composite
    pub deferred: ShaderId,
    /// SSAO occlusion estimation
    pub ssao: ShaderId,
    /// SSAO blur
    pub ssao_blur: ShaderId,
    /// Gaussian bloom blur
    pub gaussian_blur: ShaderId,
    /// Additive blend composite
    pub additive: ShaderId,
    /// Tone-mapping
    pub tonemap: ShaderId,
    /// Gamma correction
    pub gamma: ShaderId,
    /// Inversion effect
    pub inversion: ShaderId,
    /// Greyscale effect
    pub greyscale: ShaderId,
    /// Sharpen effect
    pub sharpen: ShaderId,
    /// Box blur effect
    pub box_blur: ShaderId,
    /// Edge-detection effect
    pub edge_detection: ShaderId,
    /// BRDF lookup integration, run once at startup
    pub brdf_lut: ShaderId,
}

impl ShaderSet {
    /// Compile and link every built-in program
    pub fn build(backend: &mut dyn RenderBackend) -> RenderResult<Self> {
        use sources::*;
        Ok(Self {
            quad: backend.create_shader("quad", QUAD_VERT, QUAD_FRAG)?,
            circle: backend.create_shader("circle", CIRCLE_VERT, CIRCLE_FRAG)?,
            line: backend.create_shader("line", LINE_VERT, LINE_FRAG)?,
            mesh: backend.create_shader("mesh", MESH_VERT, MESH_FRAG)?,
            outline: backend.create_shader("outline", LINE_VERT, LINE_FRAG)?,
            skybox: backend.create_shader("skybox", SKYBOX_VERT, SKYBOX_FRAG)?,
            deferred: backend.create_shader("deferred", FULLSCREEN_VERT, DEFERRED_FRAG)?,
            ssao: backend.create_shader("ssao", FULLSCREEN_VERT, SSAO_FRAG)?,
            ssao_blur: backend.create_shader("ssao_blur", FULLSCREEN_VERT, SSAO_BLUR_FRAG)?,
            gaussian_blur: backend.create_shader(
                "gaussian_blur",
                FULLSCREEN_VERT,
                GAUSSIAN_BLUR_FRAG,
            )?,
            additive: backend.create_shader("additive", FULLSCREEN_VERT, ADDITIVE_FRAG)?,
            tonemap: backend.create_shader("tonemap", FULLSCREEN_VERT, TONEMAP_FRAG)?,
            gamma: backend.create_shader("gamma", FULLSCREEN_VERT, GAMMA_FRAG)?,
            inversion: backend.create_shader("inversion", FULLSCREEN_VERT, INVERSION_FRAG)?,
            greyscale: backend.create_shader("greyscale", FULLSCREEN_VERT, GREYSCALE_FRAG)?,
            sharpen: backend.create_shader("sharpen", FULLSCREEN_VERT, SHARPEN_FRAG)?,
            box_blur: backend.create_shader("box_blur", FULLSCREEN_VERT, BOX_BLUR_FRAG)?,
            edge_detection: backend.create_shader(
                "edge_detection",
                FULLSCREEN_VERT,
                EDGE_DETECTION_FRAG,
            )?,
            brdf_lut: backend.create_shader("brdf_lut", FULLSCREEN_VERT, BRDF_LUT_FRAG)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    #[test]
    fn all_programs_build() {
        let mut backend = HeadlessBackend::new();
        let shaders = ShaderSet::build(&mut backend).expect("shader set");
        assert_ne!(shaders.quad, shaders.circle);
    }

    #[test]
    fn sources_declare_matching_glsl_version() {
        for src in [
            sources::QUAD_VERT,
            sources::MESH_FRAG,
            sources::DEFERRED_FRAG,
            sources::SSAO_FRAG,
            sources::GAMMA_FRAG,
        ] {
            assert!(src.starts_with("#version 430 core"));
        }
    }
}
