//! Orbit camera for the configurator viewport
//!
//! The camera orbits the origin on a fixed polar angle. Only the azimuth
//! changes, through user drags and auto-rotate; pan and zoom are disabled.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Camera uniform buffer data
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera position (w = 1).
    pub eye: [f32; 4],
}

/// Saved orbit state, used to restore the camera after a snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Orbit target.
    pub target: Vec3,
    /// Azimuth around +Y in radians, 0 looks down -Z from +Z.
    pub azimuth: f32,
    /// Polar angle from +Y in radians.
    pub polar: f32,
    /// Distance from the target.
    pub distance: f32,
}

impl CameraPose {
    /// Camera position for this pose
    pub fn position(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        self.target + self.distance * Vec3::new(sin_polar * sin_az, cos_polar, sin_polar * cos_az)
    }
}

/// Orbit camera
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pose: CameraPose,
    canonical: CameraPose,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Viewport aspect ratio.
    pub aspect: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    min_distance: f32,
    max_distance: f32,
    orbit_sensitivity: f32,
}

impl OrbitCamera {
    /// Create a camera at the configured canonical pose
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let min_distance = config.min_distance.min(config.max_distance);
        let max_distance = config.max_distance.max(config.min_distance);
        let position = Vec3::from(config.position);
        let canonical = CameraPose {
            target: Vec3::ZERO,
            azimuth: position.x.atan2(position.z),
            polar: config.polar_angle,
            distance: position.length().clamp(min_distance, max_distance),
        };

        Self {
            pose: canonical,
            canonical,
            fov: config.fov_degrees.clamp(10.0, 120.0).to_radians(),
            aspect,
            near: config.near_plane.max(0.001),
            far: config.far_plane.max(config.near_plane + 1.0),
            min_distance,
            max_distance,
            orbit_sensitivity: config.orbit_sensitivity,
        }
    }

    /// Update aspect ratio
    pub fn update_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Current orbit pose
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// The pose snapshots are taken from
    pub fn canonical_pose(&self) -> CameraPose {
        self.canonical
    }

    /// Restore a saved pose. The polar angle stays pinned and the distance
    /// stays within limits.
    pub fn set_pose(&mut self, pose: CameraPose) {
        self.pose = CameraPose {
            target: pose.target,
            azimuth: wrap_angle(pose.azimuth),
            polar: self.canonical.polar,
            distance: pose.distance.clamp(self.min_distance, self.max_distance),
        };
    }

    /// Jump back to the canonical pose
    pub fn reset(&mut self) {
        self.pose = self.canonical;
    }

    /// Orbit from a pointer drag in pixels. Vertical motion is ignored
    /// because the polar angle is pinned.
    pub fn orbit_drag(&mut self, delta_x: f32, _delta_y: f32) {
        self.rotate(-delta_x * self.orbit_sensitivity);
    }

    /// Rotate around the target by an azimuth delta in radians
    pub fn rotate(&mut self, delta_azimuth: f32) {
        self.pose.azimuth = wrap_angle(self.pose.azimuth + delta_azimuth);
    }

    /// Auto-rotate for `dt` seconds; speed 1.0 is one turn per minute
    pub fn auto_rotate(&mut self, dt: f32, speed: f32) {
        self.rotate(std::f32::consts::TAU / 60.0 * speed * dt);
    }

    /// Camera position
    pub fn position(&self) -> Vec3 {
        self.pose.position()
    }

    /// Get view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.pose.target, Vec3::Y)
    }

    /// Get projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Get camera uniform data
    pub fn uniform(&self) -> CameraUniform {
        let view_proj = self.projection_matrix() * self.view_matrix();
        let eye = self.position();
        CameraUniform {
            view_proj: view_proj.to_cols_array_2d(),
            eye: [eye.x, eye.y, eye.z, 1.0],
        }
    }
}

fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(std::f32::consts::TAU)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(&CameraConfig::default(), 1.0)
    }

    #[test]
    fn test_canonical_pose() {
        let camera = camera();
        let pose = camera.pose();
        assert!((pose.distance - 180.0_f32.sqrt()).abs() < 1e-4);
        assert!((pose.polar - std::f32::consts::PI / 2.5).abs() < 1e-6);

        // Same side of the origin as (8, 4, 10)
        let position = camera.position();
        assert!(position.x > 0.0 && position.y > 0.0 && position.z > 0.0);
        assert!((position.x / position.z - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_orbit_keeps_polar_and_distance() {
        let mut camera = camera();
        let before = camera.position();
        camera.orbit_drag(120.0, 300.0);
        let after = camera.position();
        assert!((before.y - after.y).abs() < 1e-4);
        assert!((before.length() - after.length()).abs() < 1e-4);
        assert!((before - after).length() > 0.1);
    }

    #[test]
    fn test_set_pose_clamps() {
        let mut camera = camera();
        let mut pose = camera.pose();
        pose.distance = 100.0;
        pose.polar = 0.1;
        camera.set_pose(pose);
        assert_eq!(camera.pose().distance, 15.0);
        assert!((camera.pose().polar - std::f32::consts::PI / 2.5).abs() < 1e-6);

        pose.distance = 1.0;
        camera.set_pose(pose);
        assert_eq!(camera.pose().distance, 5.0);
    }

    #[test]
    fn test_auto_rotate_speed() {
        let mut camera = camera();
        let start = camera.pose().azimuth;
        camera.auto_rotate(10.0, 1.5);
        let turned = wrap_angle(camera.pose().azimuth - start);
        // 1.5 turns per minute for 10 s is a quarter turn
        assert!((turned - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn test_reset_restores_canonical() {
        let mut camera = camera();
        camera.rotate(2.0);
        assert_ne!(camera.pose(), camera.canonical_pose());
        camera.reset();
        assert_eq!(camera.pose(), camera.canonical_pose());
    }
}
