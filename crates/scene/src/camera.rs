use crate::scene::Viewport;
use glam::{Mat4, Vec3};

/// Perspective projection plus the point the camera looks at.
///
/// The eye position is the camera node's world position, so the same
/// camera can sit inside a group and move with it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub target: Vec3,
    pub up: Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            aspect,
            near,
            far,
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }

    /// Match the aspect ratio to a viewport.
    pub fn set_viewport(&mut self, viewport: &Viewport) {
        self.aspect = viewport.aspect();
    }

    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    pub fn view_matrix(&self, eye: Vec3) -> Mat4 {
        Mat4::look_at_rh(eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_radians(), self.aspect, self.near, self.far)
    }
}
