use extrudekit_settings::CameraSettings;
use glam::{Mat4, Vec3};

use crate::framing::CameraFrame;

/// Radians per second of auto-rotation at speed 1 (one turn a minute)
const AUTO_ROTATE_RATE: f32 = std::f32::consts::TAU / 60.0;
/// Keep the polar angle away from the poles so `look_at` stays defined
const POLAR_EPSILON: f32 = 1e-3;

/// Perspective camera orbiting a target point, Y up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov: f32, // degrees, vertical
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub damping: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            fov: 75.0,
            aspect_ratio: 1.0,
            near: 0.1,
            far: 1000.0,
            min_distance: 0.1,
            max_distance: 100.0,
            auto_rotate: false,
            auto_rotate_speed: 1.0,
            damping: 0.05,
        }
    }
}

impl Camera {
    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self {
            fov: settings.fov_degrees,
            near: settings.near,
            far: settings.far,
            min_distance: settings.min_distance,
            max_distance: settings.max_distance,
            auto_rotate_speed: settings.auto_rotate_speed,
            damping: settings.damping,
            ..Default::default()
        }
    }

    pub fn update_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    pub fn frame(&self) -> CameraFrame {
        CameraFrame {
            position: self.position,
            target: self.target,
        }
    }

    /// Place the camera at `frame` and look at its target
    pub fn set_frame(&mut self, frame: &CameraFrame) {
        self.position = frame.position;
        self.look_at(frame.target);
    }

    /// Re-aim at a new target without moving
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Rotate the camera about the target.
    ///
    /// `delta_azimuth` turns about +Y, `delta_polar` tilts toward the poles.
    pub fn orbit(&mut self, delta_azimuth: f32, delta_polar: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let azimuth = offset.x.atan2(offset.z) + delta_azimuth;
        let polar = ((offset.y / radius).clamp(-1.0, 1.0).acos() + delta_polar)
            .clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON);

        let (sin_polar, cos_polar) = polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = azimuth.sin_cos();
        self.position = self.target
            + Vec3::new(sin_polar * sin_azimuth, cos_polar, sin_polar * cos_azimuth) * radius;
    }

    /// Move toward the target by `delta`, staying within the distance limits
    pub fn zoom(&mut self, delta: f32) {
        let offset = self.position - self.target;
        let direction = offset.normalize_or(Vec3::Z);
        let distance = (offset.length() - delta).clamp(self.min_distance, self.max_distance);
        self.position = self.target + direction * distance;
    }

    /// Slide camera and target together in the view plane
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let forward = (self.target - self.position).normalize_or(Vec3::NEG_Z);
        let world_up = if forward.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let right = forward.cross(world_up).normalize();
        let up = right.cross(forward).normalize();

        let scale = self.distance() * 0.001;
        let shift = up * delta_y * scale - right * delta_x * scale;
        self.position += shift;
        self.target += shift;
    }

    /// Per-frame update; returns true when the camera moved
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.auto_rotate || dt <= 0.0 {
            return false;
        }
        self.orbit(AUTO_ROTATE_RATE * self.auto_rotate_speed * dt, 0.0);
        true
    }

    pub fn view_matrix(&self) -> Mat4 {
        let forward = self.target - self.position;
        let up = if forward.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(self.position, self.target, up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect_ratio,
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
