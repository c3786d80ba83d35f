//! Uniform block layouts shared with the shaders
//!
//! Every struct here is `#[repr(C)]` + `Pod` and mirrors a `std140` uniform
//! block; binding slots are fixed for the renderer's lifetime and each slot
//! carries exactly one semantic struct.

use crate::foundation::math::{mat4_to_cols, Mat4, Vec3};
use bytemuck::{Pod, Zeroable};

/// Camera data, binding 0
pub const CAMERA_BINDING: u32 = 0;
/// Per-frame settings, binding 1
pub const FRAME_SETTINGS_BINDING: u32 = 1;
/// Post-process effect parameters, binding 2
pub const POST_SETTINGS_BINDING: u32 = 2;
/// Light count, binding 3
pub const LIGHT_COUNT_BINDING: u32 = 3;
/// SSAO hemisphere kernel, binding 4
pub const SSAO_KERNEL_BINDING: u32 = 4;
/// Light array storage buffer, storage binding 0
pub const LIGHT_STORAGE_BINDING: u32 = 0;

/// Camera matrices and position, uploaded once per scene
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    /// World-to-camera transform
    pub view: [[f32; 4]; 4],
    /// Camera-to-clip transform
    pub projection: [[f32; 4]; 4],
    /// Pre-multiplied view-projection
    pub view_projection: [[f32; 4]; 4],
    /// Camera world position (xyz) + padding
    pub position: [f32; 4],
}

impl CameraUniform {
    /// Build from view/projection matrices and world position
    pub fn new(view: &Mat4, projection: &Mat4, position: Vec3) -> Self {
        Self {
            view: mat4_to_cols(view),
            projection: mat4_to_cols(projection),
            view_projection: mat4_to_cols(&(projection * view)),
            position: [position.x, position.y, position.z, 1.0],
        }
    }
}

/// Global per-frame settings consumed across passes
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FrameSettingsUniform {
    /// Gamma exponent for the final correction pass
    pub gamma: f32,
    /// HDR exposure for tone-mapping
    pub exposure: f32,
    /// Parallax-mapping height scale
    pub parallax_scale: f32,
    /// Luminance threshold for the bloom bright-color output
    pub bloom_threshold: f32,
    /// Rasterized point size, read via `gl_PointSize`
    pub point_size: f32,
    /// Padding to a 16-byte boundary
    pub _padding: [f32; 3],
}

/// Per-effect parameters uploaded immediately before each post-process draw
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PostSettingsUniform {
    /// Effect strength multiplier
    pub strength: f32,
    /// Sample offset for kernel effects
    pub kernel_offset: f32,
    /// Gaussian blur direction toggle (> 0.5 = horizontal)
    pub horizontal: f32,
    /// Padding to a 16-byte boundary
    pub _padding: f32,
}

/// Number of active lights in the storage buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightCountUniform {
    /// Active light count
    pub count: i32,
    /// Padding to a 16-byte boundary
    pub _padding: [i32; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_blocks_are_sixteen_byte_aligned() {
        assert_eq!(std::mem::size_of::<CameraUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<FrameSettingsUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<PostSettingsUniform>(), 16);
        assert_eq!(std::mem::size_of::<LightCountUniform>(), 16);
    }

    #[test]
    fn camera_uniform_premultiplies_view_projection() {
        let view = Mat4::new_translation(&Vec3::new(0.0, 0.0, -5.0));
        let projection = Mat4::new_scaling(2.0);
        let uniform = CameraUniform::new(&view, &projection, Vec3::zeros());
        let expected = mat4_to_cols(&(projection * view));
        assert_eq!(uniform.view_projection, expected);
    }
}
