//! Perspective camera looking at the globe.

use glam::{Mat4, Vec3};

/// Fixed perspective camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width divided by height.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    projection: Mat4,
}

impl Camera {
    /// Create a camera with the default framing for the given aspect ratio.
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            fov_y: 75.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 2_000.0,
            position: Vec3::new(0.0, 0.0, 6.0),
            target: Vec3::ZERO,
            projection: Mat4::IDENTITY,
        };
        camera.set_aspect(aspect);
        camera
    }

    /// Change the aspect ratio and recompute the projection.
    ///
    /// Non-finite or non-positive ratios are ignored.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
        self.update_projection();
    }

    /// Recompute the projection matrix from the current parameters.
    pub fn update_projection(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_aspect_updates_projection() {
        let mut camera = Camera::new(1.0);
        let square = camera.projection();
        camera.set_aspect(2.0);
        assert_eq!(camera.aspect, 2.0);
        assert_ne!(camera.projection(), square);
        assert_eq!(
            camera.projection(),
            Mat4::perspective_rh(camera.fov_y, 2.0, camera.near, camera.far)
        );
    }

    #[test]
    fn test_invalid_aspect_is_ignored() {
        let mut camera = Camera::new(1.5);
        camera.set_aspect(0.0);
        camera.set_aspect(f32::NAN);
        camera.set_aspect(f32::INFINITY);
        assert_eq!(camera.aspect, 1.5);
    }

    #[test]
    fn test_origin_projects_to_screen_center() {
        let camera = Camera::new(1.0);
        let clip = camera.view_proj() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
