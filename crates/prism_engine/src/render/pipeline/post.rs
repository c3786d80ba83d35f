//! Post-processing effect catalog and shared screen-space resources
//!
//! Every effect draws the same full-screen quad and differs only in which
//! fragment program and source textures are bound immediately prior, plus a
//! small parameter struct uploaded to the post-settings uniform buffer.

use crate::foundation::math::lerp;
use crate::render::api::{
    RenderBackend, ShaderId, TextureFilter, TextureFormat, TextureId, TextureSpec, VertexArrayId,
    VertexAttributeFormat, VertexLayout,
};
use crate::render::buffer::{IndexBuffer, UniformBuffer, VertexBuffer};
use crate::render::uniforms::{PostSettingsUniform, POST_SETTINGS_BINDING, SSAO_KERNEL_BINDING};
use crate::render::RenderResult;
use rand::{Rng, SeedableRng};

/// Number of hemisphere samples in the SSAO kernel
pub const SSAO_KERNEL_SIZE: usize = 64;
/// Edge length of the tiling SSAO rotation-noise texture
pub const SSAO_NOISE_SIZE: u32 = 4;
/// Gaussian ping-pong iterations per bloom application
pub const BLOOM_ITERATIONS: usize = 20;
/// Capacity of the per-entity post-effect list
pub const MAX_POST_EFFECTS: usize = 8;

/// The fixed catalog of screen-space effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostEffect {
    /// No effect; skipped entirely
    #[default]
    None,
    /// Color inversion
    Inversion,
    /// Luminance greyscale
    Greyscale,
    /// Sharpen kernel
    Sharpen,
    /// Box blur kernel
    Blur,
    /// Edge-detection kernel
    EdgeDetection,
    /// Gamma correction
    GammaCorrection,
    /// Exposure tone-mapping
    ToneMapping,
    /// One directional Gaussian blur iteration
    GaussianBlur,
    /// Ambient-occlusion estimation from the G-buffer
    Ssao,
    /// Ambient-occlusion blur
    SsaoBlur,
    /// Additive blend of the bloom result onto the base color
    AdditiveBlending,
    /// Deferred PBR lighting composite
    DeferredLighting,
}

/// Numeric parameters uploaded per effect draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostEffectParams {
    /// Effect strength multiplier
    pub strength: f32,
    /// Sample offset for kernel effects
    pub kernel_offset: f32,
}

impl Default for PostEffectParams {
    fn default() -> Self {
        Self {
            strength: 1.0,
            kernel_offset: 1.0 / 300.0,
        }
    }
}

/// Shared screen-space draw resources: the full-screen quad, the per-effect
/// parameter buffer, and the SSAO kernel/noise uploaded once at startup
#[derive(Debug)]
pub struct PostProcessor {
    quad_vertex_buffer: VertexBuffer,
    quad_index_buffer: IndexBuffer,
    quad_vertex_array: VertexArrayId,
    params_buffer: UniformBuffer,
    kernel_buffer: UniformBuffer,
    noise_texture: TextureId,
}

impl PostProcessor {
    /// Build the shared resources and upload the SSAO kernel and noise
    pub fn new(backend: &mut dyn RenderBackend) -> RenderResult<Self> {
        // Two UV-mapped triangles covering clip space.
        let vertices: [f32; 16] = [
            -1.0, -1.0, 0.0, 0.0, //
            1.0, -1.0, 1.0, 0.0, //
            1.0, 1.0, 1.0, 1.0, //
            -1.0, 1.0, 0.0, 1.0,
        ];
        let indices: [u32; 6] = [0, 1, 2, 2, 3, 0];
        let quad_vertex_buffer =
            VertexBuffer::with_data(backend, bytemuck::cast_slice(&vertices))?;
        let quad_index_buffer = IndexBuffer::with_data(backend, &indices)?;
        let layout = VertexLayout::new(&[
            VertexAttributeFormat::Float2,
            VertexAttributeFormat::Float2,
        ]);
        let quad_vertex_array = backend.create_vertex_array(
            quad_vertex_buffer.id(),
            Some(quad_index_buffer.id()),
            &layout,
        )?;

        let params_buffer = UniformBuffer::new(
            backend,
            std::mem::size_of::<PostSettingsUniform>(),
            POST_SETTINGS_BINDING,
        )?;

        let kernel = generate_ssao_kernel();
        let kernel_buffer = UniformBuffer::new(
            backend,
            std::mem::size_of_val(&kernel),
            SSAO_KERNEL_BINDING,
        )?;
        kernel_buffer.set_data(backend, &kernel);

        let noise = generate_ssao_noise();
        let noise_texture = backend.create_texture(
            &TextureSpec {
                width: SSAO_NOISE_SIZE,
                height: SSAO_NOISE_SIZE,
                format: TextureFormat::Rgba16F,
                filter: TextureFilter::Nearest,
                repeat: true,
            },
            Some(bytemuck::cast_slice(&noise)),
        )?;

        Ok(Self {
            quad_vertex_buffer,
            quad_index_buffer,
            quad_vertex_array,
            params_buffer,
            kernel_buffer,
            noise_texture,
        })
    }

    /// Upload `params` and draw the full-screen quad through `shader`
    ///
    /// Source textures must already be bound to their slots; the caller
    /// accounts for the draw call in its statistics.
    pub fn apply(
        &self,
        backend: &mut dyn RenderBackend,
        shader: ShaderId,
        params: PostEffectParams,
        horizontal: bool,
    ) {
        self.params_buffer.set_data(
            backend,
            &PostSettingsUniform {
                strength: params.strength,
                kernel_offset: params.kernel_offset,
                horizontal: if horizontal { 1.0 } else { 0.0 },
                _padding: 0.0,
            },
        );
        backend.draw_indexed(self.quad_vertex_array, shader, None);
    }

    /// The 4x4 rotation-noise texture sampled by the SSAO pass
    pub fn noise_texture(&self) -> TextureId {
        self.noise_texture
    }

    /// The shared full-screen quad, for passes that bind textures themselves
    pub fn quad(&self) -> VertexArrayId {
        self.quad_vertex_array
    }

    /// Release the GPU resources owned by the processor
    pub fn destroy(self, backend: &mut dyn RenderBackend) {
        backend.destroy_vertex_array(self.quad_vertex_array);
        self.quad_vertex_buffer.destroy(backend);
        self.quad_index_buffer.destroy(backend);
        self.params_buffer.destroy(backend);
        self.kernel_buffer.destroy(backend);
        backend.destroy_texture(self.noise_texture);
    }
}

/// Hemisphere sample kernel biased toward the origin
///
/// Each sample is a random direction in the +Z hemisphere, normalized, given
/// a random magnitude, then scaled by `lerp(0.1, 1.0, t^2)` where t is the
/// sample's index fraction so more samples land near the shaded point.
fn generate_ssao_kernel() -> [[f32; 4]; SSAO_KERNEL_SIZE] {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x55A0);
    let mut kernel = [[0.0; 4]; SSAO_KERNEL_SIZE];
    for (i, sample) in kernel.iter_mut().enumerate() {
        let mut v = nalgebra::Vector3::new(
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>(),
        );
        if v.norm() > 0.0 {
            v = v.normalize();
        }
        v *= rng.gen::<f32>();
        let t = i as f32 / SSAO_KERNEL_SIZE as f32;
        v *= lerp(0.1, 1.0, t * t);
        *sample = [v.x, v.y, v.z, 0.0];
    }
    kernel
}

/// Random rotation vectors tiled across the screen by the SSAO pass
fn generate_ssao_noise() -> [[f32; 4]; (SSAO_NOISE_SIZE * SSAO_NOISE_SIZE) as usize] {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x0153);
    let mut noise = [[0.0; 4]; (SSAO_NOISE_SIZE * SSAO_NOISE_SIZE) as usize];
    for texel in &mut noise {
        *texel = [
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>() * 2.0 - 1.0,
            0.0,
            0.0,
        ];
    }
    noise
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    #[test]
    fn kernel_magnitudes_grow_with_index() {
        let kernel = generate_ssao_kernel();
        let magnitude = |s: &[f32; 4]| (s[0] * s[0] + s[1] * s[1] + s[2] * s[2]).sqrt();
        // Every sample fits the unit hemisphere scaled by the bias curve.
        for (i, sample) in kernel.iter().enumerate() {
            let t = i as f32 / SSAO_KERNEL_SIZE as f32;
            assert!(magnitude(sample) <= lerp(0.1, 1.0, t * t) + 1e-6);
            assert!(sample[2] >= 0.0, "kernel sample left the +Z hemisphere");
        }
    }

    #[test]
    fn noise_vectors_are_planar() {
        let noise = generate_ssao_noise();
        assert_eq!(noise.len(), 16);
        for texel in &noise {
            assert_eq!(texel[2], 0.0);
            assert!((-1.0..=1.0).contains(&texel[0]));
        }
    }

    #[test]
    fn post_processor_builds_headlessly() {
        let mut backend = HeadlessBackend::new();
        let post = PostProcessor::new(&mut backend).expect("post processor");
        assert_ne!(backend.texture_native_handle(post.noise_texture()), 0);
    }
}
