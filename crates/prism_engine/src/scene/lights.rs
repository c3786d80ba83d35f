//! Per-frame light gathering
//!
//! Converts (transform, light) component pairs into the flat `GpuLight`
//! array the renderer uploads. Lights live exactly one frame at the renderer
//! layer; sign conventions encode disabled features so the shader needs no
//! flags: a negative radius disables attenuation, a negative outer cutoff
//! disables the spot cone.

use crate::foundation::math::Vec3;
use crate::render::lighting::GpuLight;
use crate::scene::components::{LightComponent, LightKind, TransformComponent};

/// Direction an emitting entity points: its rotated -Z axis
fn light_direction(transform: &TransformComponent) -> Vec3 {
    transform.transform.rotation * Vec3::new(0.0, 0.0, -1.0)
}

/// Convert one component pair into its GPU record
///
/// Point lights upload a zero direction; the shader discriminates light
/// kinds from the direction/radius/cutoff signature alone.
pub fn light_record(transform: &TransformComponent, light: &LightComponent) -> GpuLight {
    let position = transform.transform.position;
    let direction = if light.kind == LightKind::Point {
        Vec3::zeros()
    } else {
        light_direction(transform)
    };

    let radius = if light.attenuation_enabled && light.kind != LightKind::Directional {
        light.radius
    } else {
        -1.0
    };
    let (inner_cutoff, outer_cutoff) = if light.kind == LightKind::Spot {
        (light.inner_angle.cos(), light.outer_angle.cos())
    } else {
        (1.0, -1.0)
    };

    GpuLight {
        position_radius: [position.x, position.y, position.z, radius],
        direction_inner: [direction.x, direction.y, direction.z, inner_cutoff],
        color_intensity: [light.color.x, light.color.y, light.color.z, light.intensity],
        params: [outer_cutoff, light.ambient, light.diffuse, light.specular],
    }
}

/// Gather every enabled light into the per-frame upload array
///
/// Works on any iterator of component pairs, so the renderer stays agnostic
/// of the scene's entity storage layout.
pub fn collect_lights<'a, I>(lights: I) -> Vec<GpuLight>
where
    I: IntoIterator<Item = (&'a TransformComponent, &'a LightComponent)>,
{
    lights
        .into_iter()
        .filter(|(_, light)| light.enabled)
        .map(|(transform, light)| light_record(transform, light))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Transform;
    use approx::assert_relative_eq;

    fn at(position: Vec3) -> TransformComponent {
        TransformComponent {
            transform: Transform::from_position(position),
        }
    }

    #[test]
    fn directional_lights_disable_attenuation_and_cone() {
        let light = LightComponent {
            kind: LightKind::Directional,
            ..Default::default()
        };
        let record = light_record(&at(Vec3::zeros()), &light);
        assert!(record.position_radius[3] < 0.0);
        assert!(record.params[0] < 0.0);
    }

    #[test]
    fn spot_lights_carry_cutoff_cosines() {
        let light = LightComponent {
            kind: LightKind::Spot,
            inner_angle: 0.2,
            outer_angle: 0.4,
            ..Default::default()
        };
        let record = light_record(&at(Vec3::new(1.0, 2.0, 3.0)), &light);
        assert_relative_eq!(record.direction_inner[3], 0.2f32.cos());
        assert_relative_eq!(record.params[0], 0.4f32.cos());
        assert_relative_eq!(record.position_radius[0], 1.0);
    }

    #[test]
    fn point_light_with_attenuation_off_encodes_negative_radius() {
        let light = LightComponent {
            attenuation_enabled: false,
            ..Default::default()
        };
        let record = light_record(&at(Vec3::zeros()), &light);
        assert!(record.position_radius[3] < 0.0);
    }

    #[test]
    fn point_lights_upload_zero_direction() {
        let record = light_record(&at(Vec3::zeros()), &LightComponent::default());
        assert_eq!(&record.direction_inner[..3], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn disabled_lights_are_filtered_out() {
        let transform = at(Vec3::zeros());
        let enabled = LightComponent::default();
        let disabled = LightComponent {
            enabled: false,
            ..Default::default()
        };
        let records = collect_lights([(&transform, &enabled), (&transform, &disabled)]);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn default_orientation_points_down_negative_z() {
        let direction = light_direction(&at(Vec3::zeros()));
        assert_relative_eq!(direction, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }
}
