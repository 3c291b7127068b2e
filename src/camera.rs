use glam::Vec3;

use crate::config::CameraConfig;
use crate::types::CameraUniform;

/// Perspective camera looking at a target point with +Y up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::ZERO,
            fov,
            aspect,
            near,
            far,
        }
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::new(config.fov, aspect, config.near, config.far);
        camera.position = Vec3::from_array(config.position);
        camera
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Update the aspect ratio after a resize; zero heights are ignored
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    pub fn right(&self) -> Vec3 {
        let right = self.forward().cross(Vec3::Y);
        // Looking straight up or down
        if right.length_squared() < 1e-12 {
            Vec3::X
        } else {
            right.normalize()
        }
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    /// Tangent of half the vertical field of view
    pub fn tan_half_fov(&self) -> f32 {
        (self.fov.to_radians() * 0.5).tan()
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            position: self.position.to_array(),
            tan_half_fov: self.tan_half_fov(),
            forward: self.forward().to_array(),
            aspect: self.aspect,
            right: self.right().to_array(),
            near: self.near,
            up: self.up().to_array(),
            far: self.far,
        }
    }

    /// World-space direction through a normalized device coordinate (-1..1, +y up)
    pub fn ray_direction(&self, ndc_x: f32, ndc_y: f32) -> Vec3 {
        let t = self.tan_half_fov();
        (self.forward() + self.right() * ndc_x * t * self.aspect + self.up() * ndc_y * t)
            .normalize()
    }
}
