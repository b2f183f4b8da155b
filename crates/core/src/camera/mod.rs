use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::config::CameraConfig;

const MIN_POLAR: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Orbit camera with inertial damping.
///
/// Drag input accumulates angular deltas. Each [`update`](Self::update)
/// applies a `damping` fraction of the pending delta and decays the rest, so
/// the camera glides to a stop over several frames after the pointer is
/// released.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    target: Vec3,
    radius: f32,
    /// Azimuth around +Y, measured from +Z.
    theta: f32,
    /// Polar angle from +Y.
    phi: f32,
    delta_theta: f32,
    delta_phi: f32,
    damping: f32,
    fov_y: f32,
    viewport: Vec2,
}

impl OrbitControls {
    pub fn new(config: &CameraConfig) -> Self {
        let offset = Vec3::from_array(config.position);
        let radius = offset.length().max(f32::EPSILON);
        Self {
            target: Vec3::ZERO,
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            delta_theta: 0.0,
            delta_phi: 0.0,
            damping: config.damping,
            fov_y: config.fov_degrees.to_radians(),
            viewport: Vec2::new(config.viewport[0] as f32, config.viewport[1] as f32),
        }
    }

    pub fn position(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        self.target
            + self.radius
                * Vec3::new(
                    sin_phi * self.theta.sin(),
                    self.phi.cos(),
                    sin_phi * self.theta.cos(),
                )
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y.max(1.0)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    }

    /// Queues a rotation for a pointer drag of `dx`, `dy` pixels. A drag across
    /// the full viewport height is one full turn.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let height = self.viewport.y.max(1.0);
        self.delta_theta -= TAU * dx / height;
        self.delta_phi -= TAU * dy / height;
    }

    /// Applies damped motion. Returns whether the camera moved noticeably.
    pub fn update(&mut self) -> bool {
        let step_theta = self.delta_theta * self.damping;
        let step_phi = self.delta_phi * self.damping;
        self.theta += step_theta;
        self.phi = (self.phi + step_phi).clamp(MIN_POLAR, PI - MIN_POLAR);

        self.delta_theta *= 1.0 - self.damping;
        self.delta_phi *= 1.0 - self.damping;

        step_theta.abs() > 1e-6 || step_phi.abs() > 1e-6
    }

    /// Ray from the eye through a point in normalised device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let origin = self.position();
        let forward = (self.target - origin).normalize();
        let right = forward.cross(Vec3::Y).normalize_or(Vec3::X);
        let up = right.cross(forward);
        let half_height = (self.fov_y * 0.5).tan();
        let half_width = half_height * self.aspect();
        let direction =
            (forward + right * ndc.x * half_width + up * ndc.y * half_height).normalize();
        Ray { origin, direction }
    }

    pub fn ray_from_pointer(&self, x: f32, y: f32) -> Ray {
        self.ray_from_ndc(pointer_to_ndc(x, y, self.viewport))
    }
}

/// Pixel coordinates (origin top-left) to NDC (origin centre, +Y up).
pub fn pointer_to_ndc(x: f32, y: f32, viewport: Vec2) -> Vec2 {
    Vec2::new(
        (x / viewport.x) * 2.0 - 1.0,
        -(y / viewport.y) * 2.0 + 1.0,
    )
}

/// Cursor shape requested from the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}
