use glam::Vec3;
use std::f32::consts::{PI, TAU};
use torusfield_scene::{Scene, SceneError};

const EPS: f32 = 1e-6;

/// Radius, polar angle from +Y, and azimuth from +Z toward +X.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let s = self.phi.sin() * self.radius;
        Vec3::new(s * self.theta.sin(), self.phi.cos() * self.radius, s * self.theta.cos())
    }
}

/// Mouse-driven orbit around a target point.
///
/// Input handlers accumulate deltas; [`OrbitControls::update`] applies them
/// to the scene camera once per frame. With damping on, each update applies
/// only a fraction of the pending motion and decays the rest.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub enable_rotate: bool,
    pub rotate_speed: f32,
    pub enable_pan: bool,
    pub pan_speed: f32,
    pub enable_zoom: bool,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    theta_delta: f32,
    phi_delta: f32,
    pan_offset: Vec3,
    scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            enable_rotate: true,
            rotate_speed: 1.0,
            enable_pan: true,
            pan_speed: 1.0,
            enable_zoom: false,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            theta_delta: 0.0,
            phi_delta: 0.0,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl OrbitControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orbit by a pointer drag of `(dx, dy)` pixels in a viewport `height` pixels tall.
    pub fn rotate(&mut self, dx: f32, dy: f32, height: f32) {
        if !self.enable_rotate || height <= 0.0 {
            return;
        }
        self.theta_delta -= TAU * dx / height * self.rotate_speed;
        self.phi_delta -= TAU * dy / height * self.rotate_speed;
    }

    /// Pan in screen space so the target follows the pointer.
    pub fn pan(&mut self, dx: f32, dy: f32, height: f32, scene: &Scene) -> Result<(), SceneError> {
        if !self.enable_pan || height <= 0.0 {
            return Ok(());
        }
        let id = scene.handles.camera;
        let camera = scene.graph.camera(id)?;
        let eye = scene.graph.world_position(id)?;

        let offset = eye - camera.target;
        let target_distance = offset.length() * (camera.fov_radians() * 0.5).tan();
        let forward = (-offset).normalize_or_zero();
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward);

        let scale = 2.0 * target_distance / height * self.pan_speed;
        self.pan_offset += -right * dx * scale + up * dy * scale;
        Ok(())
    }

    /// Wheel zoom. Ignored while zoom is disabled.
    pub fn zoom(&mut self, scroll: f32) {
        if !self.enable_zoom || scroll == 0.0 {
            return;
        }
        let step = 0.95f32.powf(self.zoom_speed);
        if scroll > 0.0 {
            self.scale *= step;
        } else {
            self.scale /= step;
        }
    }

    /// Whether any rotation or pan is still pending.
    pub fn is_moving(&self) -> bool {
        self.theta_delta.abs() > EPS
            || self.phi_delta.abs() > EPS
            || self.pan_offset.length_squared() > EPS * EPS
    }

    /// Apply pending motion to the scene camera and decay it.
    pub fn update(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let id = scene.handles.camera;
        let eye = scene.graph.world_position(id)?;
        let target = scene.graph.camera(id)?.target;

        let mut spherical = Spherical::from_offset(eye - target);
        let factor = if self.enable_damping { self.damping_factor } else { 1.0 };
        spherical.theta += self.theta_delta * factor;
        spherical.phi = (spherical.phi + self.phi_delta * factor).clamp(EPS, PI - EPS);
        spherical.radius =
            (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        let target = target + self.pan_offset * factor;
        let new_eye = target + spherical.to_offset();

        // The camera's parent group sits at the origin without rotation, so
        // local position equals world position.
        scene.graph.camera_mut(id)?.target = target;
        scene.graph.transform_mut(id)?.position = new_eye;

        if self.enable_damping {
            self.theta_delta *= 1.0 - self.damping_factor;
            self.phi_delta *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::path::Path;
    use torusfield_common::NoopLoader;
    use torusfield_scene::{SceneBuilder, SceneConfig, Viewport};

    fn scene() -> Scene {
        SceneBuilder::new(&SceneConfig::default(), Path::new("."))
            .build(
                Viewport::new(1000.0, 500.0, 1.0),
                &mut NoopLoader::default(),
                &mut StdRng::seed_from_u64(4),
            )
            .unwrap()
    }

    fn eye(s: &Scene) -> Vec3 {
        s.graph.world_position(s.handles.camera).unwrap()
    }

    #[test]
    fn spherical_round_trip() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let back = Spherical::from_offset(v).to_offset();
        assert!((back - v).length() < 1e-5);
    }

    #[test]
    fn rotation_keeps_distance() {
        let mut s = scene();
        let mut orbit = OrbitControls::new();
        orbit.rotate(120.0, -40.0, 500.0);
        for _ in 0..200 {
            orbit.update(&mut s).unwrap();
            assert!((eye(&s).length() - 6.0).abs() < 1e-3);
        }
        assert!((eye(&s) - Vec3::new(0.0, 0.0, 6.0)).length() > 0.1);
    }

    #[test]
    fn damping_decays_motion() {
        let mut s = scene();
        let mut orbit = OrbitControls::new();
        orbit.rotate(50.0, 0.0, 500.0);
        let mut steps = Vec::new();
        let mut last = eye(&s);
        for _ in 0..400 {
            orbit.update(&mut s).unwrap();
            let now = eye(&s);
            steps.push((now - last).length());
            last = now;
        }
        assert!(steps[1] < steps[0]);
        assert!(steps[399] < steps[0] * 0.01);
    }

    #[test]
    fn without_damping_motion_applies_at_once() {
        let mut s = scene();
        let mut orbit = OrbitControls {
            enable_damping: false,
            ..OrbitControls::new()
        };
        orbit.rotate(125.0, 0.0, 500.0);
        orbit.update(&mut s).unwrap();
        assert!(!orbit.is_moving());
        let e = eye(&s);
        // A quarter-height drag turns the camera by π/2 around Y.
        assert!((e - Vec3::new(-6.0, 0.0, 0.0)).length() < 1e-3, "{e}");
    }

    #[test]
    fn zoom_is_disabled_by_default() {
        let mut s = scene();
        let mut orbit = OrbitControls::new();
        orbit.zoom(10.0);
        orbit.update(&mut s).unwrap();
        assert!((eye(&s).length() - 6.0).abs() < 1e-5);
    }

    #[test]
    fn pan_moves_target_with_camera() {
        let mut s = scene();
        let mut orbit = OrbitControls {
            enable_damping: false,
            ..OrbitControls::new()
        };
        orbit.pan(100.0, 0.0, 500.0, &s).unwrap();
        orbit.update(&mut s).unwrap();
        let target = s.graph.camera(s.handles.camera).unwrap().target;
        assert!(target.x < 0.0);
        assert!(target.y.abs() < 1e-5);
        assert!(((eye(&s) - target).length() - 6.0).abs() < 1e-4);
    }
}
