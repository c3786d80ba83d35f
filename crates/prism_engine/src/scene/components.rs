//! Pure data components consumed by the renderer
//!
//! Components carry only data; conversion and submission logic lives in the
//! renderer and in [`crate::scene::lights`].

use crate::foundation::math::{Mat4, Transform, Vec3, Vec4};
use crate::render::camera::SceneCamera;
use crate::render::mesh::{Mesh, MeshMaterial};
use crate::render::pipeline::{PostEffect, MAX_POST_EFFECTS};
use crate::render::texture::Texture2D;

/// Position, rotation, and scale of an entity
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransformComponent {
    /// The entity's transform
    pub transform: Transform,
}

impl TransformComponent {
    /// Model matrix for draw submission
    pub fn matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }
}

/// A textured or flat-colored billboard quad
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteComponent {
    /// Tint color
    pub color: Vec4,
    /// Optional texture; flat color when absent
    pub texture: Option<Texture2D>,
    /// Texture tiling factor
    pub tiling: f32,
}

impl Default for SpriteComponent {
    fn default() -> Self {
        Self {
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            texture: None,
            tiling: 1.0,
        }
    }
}

/// An indexed triangle mesh with its surface material
#[derive(Debug, Clone, PartialEq)]
pub struct MeshComponent {
    /// Mesh geometry
    pub mesh: Mesh,
    /// Surface parameters
    pub material: MeshMaterial,
}

/// Marks an entity's mesh for silhouette outlining (editor selection)
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineComponent {
    /// Outline color
    pub color: Vec4,
}

impl Default for OutlineComponent {
    fn default() -> Self {
        Self {
            color: Vec4::new(1.0, 0.55, 0.0, 1.0),
        }
    }
}

/// Kinds of light an entity can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Parallel rays; position is ignored
    Directional,
    /// Omnidirectional from a point
    Point,
    /// Cone from a point
    Spot,
}

/// A light-emitting entity
#[derive(Debug, Clone, PartialEq)]
pub struct LightComponent {
    /// Light kind
    pub kind: LightKind,
    /// RGB color
    pub color: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
    /// Falloff radius for point/spot lights
    pub radius: f32,
    /// Whether distance attenuation applies
    pub attenuation_enabled: bool,
    /// Inner cone angle in radians (spot only)
    pub inner_angle: f32,
    /// Outer cone angle in radians (spot only)
    pub outer_angle: f32,
    /// Ambient strength contribution
    pub ambient: f32,
    /// Diffuse strength contribution
    pub diffuse: f32,
    /// Specular strength contribution
    pub specular: f32,
    /// Whether the light participates in shading at all
    pub enabled: bool,
}

impl Default for LightComponent {
    fn default() -> Self {
        Self {
            kind: LightKind::Point,
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            radius: 10.0,
            attenuation_enabled: true,
            inner_angle: 0.3,
            outer_angle: 0.45,
            ambient: 0.1,
            diffuse: 1.0,
            specular: 0.5,
            enabled: true,
        }
    }
}

/// The runtime camera and whether it drives the viewport
#[derive(Debug, Clone, PartialEq)]
pub struct CameraComponent {
    /// Projection parameters
    pub camera: SceneCamera,
    /// Whether this camera renders the scene
    pub primary: bool,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            camera: SceneCamera::default(),
            primary: true,
        }
    }
}

/// Editor-attached post-processing chain
///
/// Parallel fixed-size arrays of effect tags and kernel offsets, iterated in
/// order by the renderer; [`PostEffect::None`] entries are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct PostProcessComponent {
    /// Effect tags in application order
    pub effects: [PostEffect; MAX_POST_EFFECTS],
    /// Kernel offset per effect
    pub kernel_offsets: [f32; MAX_POST_EFFECTS],
}

impl Default for PostProcessComponent {
    fn default() -> Self {
        Self {
            effects: [PostEffect::None; MAX_POST_EFFECTS],
            kernel_offsets: [1.0 / 300.0; MAX_POST_EFFECTS],
        }
    }
}

impl PostProcessComponent {
    /// Set the effect at a chain position
    pub fn set_effect(&mut self, index: usize, effect: PostEffect, kernel_offset: f32) {
        debug_assert!(index < MAX_POST_EFFECTS, "post-effect index out of range");
        self.effects[index] = effect;
        self.kernel_offsets[index] = kernel_offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_process_component_defaults_to_empty_chain() {
        let component = PostProcessComponent::default();
        assert!(component.effects.iter().all(|e| *e == PostEffect::None));
    }

    #[test]
    fn set_effect_updates_parallel_arrays() {
        let mut component = PostProcessComponent::default();
        component.set_effect(0, PostEffect::Greyscale, 0.01);
        assert_eq!(component.effects[0], PostEffect::Greyscale);
        assert_eq!(component.kernel_offsets[0], 0.01);
    }
}
