//! Math utilities and types
//!
//! Provides fundamental math types for 3D graphics built on `nalgebra`.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Convert a matrix into the column-major array layout GPU uniforms expect
pub fn mat4_to_cols(m: &Mat4) -> [[f32; 4]; 4] {
    let mut out = [[0.0; 4]; 4];
    for (c, col) in out.iter_mut().enumerate() {
        for (r, v) in col.iter_mut().enumerate() {
            *v = m[(r, c)];
        }
    }
    out
}

/// Linear interpolation between two scalars
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a transform at a position with identity rotation and unit scale
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Compose the transform into a model matrix (translate * rotate * scale)
    pub fn to_matrix(&self) -> Mat4 {
        let translation = Mat4::new_translation(&self.position);
        let rotation = self.rotation.to_homogeneous();
        let scale = Mat4::new_nonuniform_scaling(&self.scale);
        translation * rotation * scale
    }

    /// View matrix for a camera placed at this transform
    ///
    /// The inverse of the model matrix; scale is ignored because cameras
    /// are never scaled.
    pub fn to_view_matrix(&self) -> Mat4 {
        let translation = Mat4::new_translation(&self.position);
        let rotation = self.rotation.to_homogeneous();
        (translation * rotation)
            .try_inverse()
            .unwrap_or_else(Mat4::identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_transform_yields_identity_matrix() {
        let t = Transform::default();
        assert_relative_eq!(t.to_matrix(), Mat4::identity());
    }

    #[test]
    fn translation_lands_in_last_column() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let m = t.to_matrix();
        assert_relative_eq!(m[(0, 3)], 1.0);
        assert_relative_eq!(m[(1, 3)], 2.0);
        assert_relative_eq!(m[(2, 3)], 3.0);
    }

    #[test]
    fn mat4_to_cols_is_column_major() {
        let t = Transform::from_position(Vec3::new(5.0, 6.0, 7.0));
        let cols = mat4_to_cols(&t.to_matrix());
        // Translation occupies the fourth column in column-major layout.
        assert_relative_eq!(cols[3][0], 5.0);
        assert_relative_eq!(cols[3][1], 6.0);
        assert_relative_eq!(cols[3][2], 7.0);
        assert_relative_eq!(cols[3][3], 1.0);
    }

    #[test]
    fn view_matrix_inverts_camera_placement() {
        let t = Transform::from_position(Vec3::new(0.0, 0.0, 5.0));
        let view = t.to_view_matrix();
        let origin = view.transform_point(&nalgebra::Point3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(origin.coords.norm(), 0.0, epsilon = 1e-6);
    }
}
