use crate::types::TriangleData;
use glam::Vec3;

/// Result of triangle intersection test
#[derive(Debug, Clone, Copy)]
pub struct TriangleIntersection {
    pub t: f32,           // Distance along ray
    pub u: f32,           // Barycentric weight of v1
    pub v: f32,           // Barycentric weight of v2
    pub normal: Vec3,     // Geometric normal (counter-clockwise winding)
    pub front_facing: bool,
}

impl TriangleIntersection {
    /// Get barycentric coordinates (u, v, w) where w = 1 - u - v
    pub fn barycentric(&self) -> (f32, f32, f32) {
        (self.u, self.v, 1.0 - self.u - self.v)
    }

    /// Interpolate per-vertex normals at the hit point
    pub fn interpolate_normal(&self, n0: Vec3, n1: Vec3, n2: Vec3) -> Vec3 {
        let (u, v, w) = self.barycentric();
        (n0 * w + n1 * u + n2 * v).normalize_or(self.normal)
    }
}

/// Möller-Trumbore ray-triangle intersection algorithm
pub fn moller_trumbore_intersect(
    ray_origin: Vec3,
    ray_dir: Vec3,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
) -> Option<TriangleIntersection> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray_dir.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray_origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray_dir.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    // Intersection behind origin
    if t < EPSILON {
        return None;
    }

    // a = -dot(ray_dir, edge1 x edge2): positive when the ray meets the front face
    let normal = edge1.cross(edge2).normalize();

    Some(TriangleIntersection {
        t,
        u,
        v,
        normal,
        front_facing: a > 0.0,
    })
}

pub fn intersect_triangle_data(
    ray_origin: Vec3,
    ray_dir: Vec3,
    triangle: &TriangleData,
) -> Option<TriangleIntersection> {
    let [v0, v1, v2] = triangle.vertices();
    moller_trumbore_intersect(ray_origin, ray_dir, v0, v1, v2)
}
