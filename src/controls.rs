use glam::Vec3;
use std::f32::consts::{PI, TAU};

use crate::camera::PerspectiveCamera;
use crate::config::ControlsConfig;
use crate::core::{Button, Controller};

/// Keeps the polar angle off the poles
const POLAR_EPSILON: f32 = 1e-6;
/// Smallest camera motion reported as a change
const CHANGE_EPSILON: f32 = 1e-6;
/// Dolly factor for one wheel line at zoom speed 1
const ZOOM_STEP: f32 = 0.95;

/// Radius, polar angle from +Y and azimuth around +Y measured from +Z
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_vector(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_vector(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Orbit a camera around a target: left drag rotates, wheel or middle drag
/// dollies, right drag (or shift + left drag) pans in screen space.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,

    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vec3,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }

    pub fn from_config(config: &ControlsConfig, target: Vec3) -> Self {
        Self {
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            ..Self::new(target)
        }
    }

    /// Azimuth change; positive turns the camera clockwise seen from above
    pub fn rotate_left(&mut self, angle: f32) {
        self.theta_delta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.phi_delta -= angle;
    }

    /// Move toward the target by `dolly_scale` (< 1)
    pub fn dolly_in(&mut self, dolly_scale: f32) {
        self.scale *= dolly_scale;
    }

    pub fn dolly_out(&mut self, dolly_scale: f32) {
        self.scale /= dolly_scale;
    }

    /// Translate the target in the camera's screen plane
    pub fn pan(&mut self, camera: &PerspectiveCamera, dx: f32, dy: f32, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let target_distance = (camera.position - self.target).length() * camera.tan_half_fov();
        let left = -2.0 * dx * target_distance / viewport_height;
        let up = 2.0 * dy * target_distance / viewport_height;
        self.pan_offset += camera.right() * left + camera.up() * up;
    }

    fn zoom_scale(&self) -> f32 {
        ZOOM_STEP.powf(self.zoom_speed)
    }

    /// Translate this frame's pointer motion into pending rotation, dolly and pan
    pub fn handle_input(
        &mut self,
        input: &dyn Controller,
        camera: &PerspectiveCamera,
        viewport_height: f32,
    ) {
        let scroll = input.scroll_delta();
        if scroll != 0.0 {
            // Positive wheel lines scroll up, which zooms in
            self.dolly_in(self.zoom_scale().powf(scroll));
        }

        let (dx, dy) = input.mouse_delta();
        if (dx == 0.0 && dy == 0.0) || viewport_height <= 0.0 {
            return;
        }

        let panning = input.is_down(Button::MouseRight)
            || (input.is_down(Button::MouseLeft) && input.is_down(Button::Shift));

        if panning {
            self.pan(camera, dx * self.pan_speed, dy * self.pan_speed, viewport_height);
        } else if input.is_down(Button::MouseLeft) {
            self.rotate_left(TAU * dx / viewport_height * self.rotate_speed);
            self.rotate_up(TAU * dy / viewport_height * self.rotate_speed);
        } else if input.is_down(Button::MouseMiddle) {
            if dy > 0.0 {
                self.dolly_out(self.zoom_scale());
            } else if dy < 0.0 {
                self.dolly_in(self.zoom_scale());
            }
        }
    }

    /// Apply pending motion to the camera. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let mut spherical = Spherical::from_vector(camera.position - self.target);
        let previous_position = camera.position;
        let previous_target = self.target;

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        spherical.theta += self.theta_delta * factor;
        spherical.phi = (spherical.phi + self.phi_delta * factor)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        spherical.radius = (spherical.radius * self.scale)
            .clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * factor;

        camera.position = self.target + spherical.to_vector();
        camera.look_at(self.target);

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

        camera.position.distance_squared(previous_position) > CHANGE_EPSILON
            || self.target.distance_squared(previous_target) > CHANGE_EPSILON
    }

    pub fn distance(&self, camera: &PerspectiveCamera) -> f32 {
        camera.position.distance(self.target)
    }
}
