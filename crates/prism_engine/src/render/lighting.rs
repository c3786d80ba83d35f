//! GPU light records
//!
//! Lights are rebuilt from the scene every frame and uploaded to the light
//! storage buffer; they have no persistent identity at the renderer layer.

use bytemuck::{Pod, Zeroable};

/// One light as the deferred shader consumes it (std430 layout, 64 bytes)
///
/// Sign conventions carried in the packing:
/// - a negative radius disables distance attenuation
/// - a negative outer cutoff disables the spot cone entirely
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    /// World position (xyz) + falloff radius (w)
    pub position_radius: [f32; 4],
    /// World direction (xyz) + cosine of the inner cutoff angle (w)
    pub direction_inner: [f32; 4],
    /// Color (rgb) + intensity (a)
    pub color_intensity: [f32; 4],
    /// Cosine of the outer cutoff angle, ambient, diffuse, specular strengths
    pub params: [f32; 4],
}

impl GpuLight {
    /// Falloff radius; negative means attenuation is disabled
    pub fn radius(&self) -> f32 {
        self.position_radius[3]
    }

    /// Cosine of the outer cutoff; negative means the cone is disabled
    pub fn outer_cutoff(&self) -> f32 {
        self.params[0]
    }

    /// Whether distance attenuation applies
    pub fn attenuation_enabled(&self) -> bool {
        self.radius() >= 0.0
    }

    /// Whether the spot cone applies
    pub fn cone_enabled(&self) -> bool {
        self.outer_cutoff() >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_light_is_sixty_four_bytes() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 64);
    }

    #[test]
    fn sign_encodings_gate_features() {
        let mut light = GpuLight::zeroed();
        light.position_radius[3] = -1.0;
        light.params[0] = -1.0;
        assert!(!light.attenuation_enabled());
        assert!(!light.cone_enabled());

        light.position_radius[3] = 10.0;
        light.params[0] = 0.9;
        assert!(light.attenuation_enabled());
        assert!(light.cone_enabled());
    }
}
