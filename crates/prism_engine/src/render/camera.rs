//! Camera types feeding the scene uniform upload
//!
//! Two camera flavors exist: the runtime [`SceneCamera`], which carries only
//! projection parameters and is positioned by an entity transform, and the
//! editor-only [`EditorCamera`], which owns its own view matrix. Both
//! converge on the same [`CameraMatrices`] upload.

use crate::foundation::math::{Mat4, Transform, Vec3};

/// View/projection pair plus world position, as the uniform upload needs it
#[derive(Debug, Clone, PartialEq)]
pub struct CameraMatrices {
    /// World-to-camera transform
    pub view: Mat4,
    /// Camera-to-clip transform
    pub projection: Mat4,
    /// Camera world position
    pub position: Vec3,
}

/// Runtime scene camera: projection parameters only, placed by a transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneCamera {
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Viewport aspect ratio (width / height)
    pub aspect: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self {
            fov_y: std::f32::consts::FRAC_PI_3,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl SceneCamera {
    /// Perspective projection matrix
    pub fn projection(&self) -> Mat4 {
        Mat4::new_perspective(self.aspect, self.fov_y, self.near, self.far)
    }

    /// Update the aspect ratio on viewport resize
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Combine with the owning entity's transform into an upload
    pub fn matrices(&self, transform: &Transform) -> CameraMatrices {
        CameraMatrices {
            view: transform.to_view_matrix(),
            projection: self.projection(),
            position: transform.position,
        }
    }
}

/// Editor-only free camera owning its own view matrix
#[derive(Debug, Clone, PartialEq)]
pub struct EditorCamera {
    /// Projection parameters, shared with the runtime camera type
    pub camera: SceneCamera,
    /// Camera world position
    pub position: Vec3,
    /// Yaw angle in radians
    pub yaw: f32,
    /// Pitch angle in radians
    pub pitch: f32,
}

impl Default for EditorCamera {
    fn default() -> Self {
        Self {
            camera: SceneCamera::default(),
            position: Vec3::new(0.0, 2.0, 8.0),
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

impl EditorCamera {
    /// Forward direction derived from yaw/pitch
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }

    /// View matrix looking along the current orientation
    pub fn view(&self) -> Mat4 {
        let target = self.position + self.forward();
        Mat4::look_at_rh(
            &self.position.into(),
            &target.into(),
            &Vec3::new(0.0, 1.0, 0.0),
        )
    }

    /// Matrices for the scene uniform upload
    pub fn matrices(&self) -> CameraMatrices {
        CameraMatrices {
            view: self.view(),
            projection: self.camera.projection(),
            position: self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn scene_camera_tracks_viewport_aspect() {
        let mut camera = SceneCamera::default();
        camera.set_viewport(800, 400);
        assert_relative_eq!(camera.aspect, 2.0);
        // Degenerate viewports leave the aspect untouched.
        camera.set_viewport(0, 400);
        assert_relative_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn editor_camera_defaults_look_down_negative_z() {
        let camera = EditorCamera::default();
        let forward = camera.forward();
        assert_relative_eq!(forward.z, -1.0, epsilon = 1e-6);
        assert_relative_eq!(forward.norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn both_camera_flavors_produce_matching_projections() {
        let scene_camera = SceneCamera::default();
        let editor_camera = EditorCamera::default();
        let from_scene = scene_camera.matrices(&Transform::default());
        let from_editor = editor_camera.matrices();
        assert_relative_eq!(from_scene.projection, from_editor.projection);
    }
}
