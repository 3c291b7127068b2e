use glam::Vec3;

use crate::core::bvh::BVHPrimitive;
use crate::math::AABB;

/// Triangle flag: occludes the directional light
pub const FLAG_CAST_SHADOW: u32 = 1;
/// Triangle flag: shading traces shadow rays from this surface
pub const FLAG_RECEIVE_SHADOW: u32 = 1 << 1;
/// Triangle flag: visible from both sides
pub const FLAG_DOUBLE_SIDED: u32 = 1 << 2;

/// Camera uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub position: [f32; 3],
    pub tan_half_fov: f32,
    pub forward: [f32; 3],
    pub aspect: f32,
    pub right: [f32; 3],
    pub near: f32,
    pub up: [f32; 3],
    pub far: f32,
}

/// Lights, fog and background for the shading pass
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub moon_color: [f32; 3],
    pub moon_intensity: f32,
    pub moon_direction: [f32; 3],
    pub shadow_samples: u32,
    pub fog_color: [f32; 3],
    pub fog_near: f32,
    pub background: [f32; 3],
    pub fog_far: f32,
    pub shadow_softness: f32,
    pub shadows_enabled: u32,
    pub fog_enabled: u32,
    pub triangle_count: u32,
}

/// World-space triangle with smooth vertex normals
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TriangleData {
    pub v0: [f32; 3],
    pub material: u32,
    pub v1: [f32; 3],
    pub flags: u32,
    pub v2: [f32; 3],
    pub _pad0: u32,
    pub n0: [f32; 3],
    pub _pad1: u32,
    pub n1: [f32; 3],
    pub _pad2: u32,
    pub n2: [f32; 3],
    pub _pad3: u32,
}

impl TriangleData {
    pub fn new(positions: [Vec3; 3], normals: [Vec3; 3], material: u32, flags: u32) -> Self {
        Self {
            v0: positions[0].to_array(),
            material,
            v1: positions[1].to_array(),
            flags,
            v2: positions[2].to_array(),
            _pad0: 0,
            n0: normals[0].to_array(),
            _pad1: 0,
            n1: normals[1].to_array(),
            _pad2: 0,
            n2: normals[2].to_array(),
            _pad3: 0,
        }
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [
            Vec3::from_array(self.v0),
            Vec3::from_array(self.v1),
            Vec3::from_array(self.v2),
        ]
    }

    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}

impl BVHPrimitive for TriangleData {
    fn bounds(&self) -> AABB {
        let [a, b, c] = self.vertices();
        AABB::new(a.min(b).min(c), a.max(b).max(c))
    }

    fn centroid(&self) -> Vec3 {
        let [a, b, c] = self.vertices();
        (a + b + c) / 3.0
    }
}

/// Flat material for GPU: albedo plus side mode
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialData {
    pub color: [f32; 3],
    pub double_sided: u32,
}
