use glam::Vec3;
use std::f32::consts::{PI, TAU};

use crate::math::AABB;

/// Indexed triangle mesh with per-vertex normals.
///
/// Front faces wind counter-clockwise when seen from outside.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Axis-aligned box centred at the origin
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let half = Vec3::new(width, height, depth) * 0.5;

        // (normal, u, v) with u × v == normal
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut geometry = Geometry::default();
        for (normal, u, v) in faces {
            geometry.push_quad(normal * half, u * half, v * half, normal);
        }
        geometry
    }

    /// Rectangle in the XY plane facing +Z
    pub fn plane(width: f32, height: f32) -> Self {
        let mut geometry = Geometry::default();
        geometry.push_quad(
            Vec3::ZERO,
            Vec3::X * width * 0.5,
            Vec3::Y * height * 0.5,
            Vec3::Z,
        );
        geometry
    }

    /// Closed cone with its apex at `+height/2` and base cap at `-height/2`.
    ///
    /// Base ring vertices start on +Z and advance toward +X, so a four-segment
    /// cone is a square pyramid with its corners on the axes.
    pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Self {
        let segments = radial_segments.max(3);
        let half_height = height * 0.5;
        let slope = radius / height;

        let mut geometry = Geometry::default();

        // Side: one apex vertex per segment so each carries its own normal
        for i in 0..=segments {
            let theta = i as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            let normal = Vec3::new(sin, slope, cos).normalize();

            geometry.positions.push(Vec3::new(0.0, half_height, 0.0));
            geometry.normals.push(normal);
            geometry
                .positions
                .push(Vec3::new(radius * sin, -half_height, radius * cos));
            geometry.normals.push(normal);
        }
        for i in 0..segments {
            let apex = 2 * i;
            let base = apex + 1;
            let next_base = apex + 3;
            geometry.indices.extend([base, next_base, apex]);
        }

        // Base cap
        let ring_start = geometry.positions.len() as u32;
        for i in 0..=segments {
            let theta = i as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            geometry
                .positions
                .push(Vec3::new(radius * sin, -half_height, radius * cos));
            geometry.normals.push(Vec3::NEG_Y);
        }
        let center = geometry.positions.len() as u32;
        geometry.positions.push(Vec3::new(0.0, -half_height, 0.0));
        geometry.normals.push(Vec3::NEG_Y);
        for i in 0..segments {
            geometry
                .indices
                .extend([center, ring_start + i + 1, ring_start + i]);
        }

        geometry
    }

    /// Latitude/longitude sphere.
    ///
    /// `width_segments` is clamped to at least 3 and `height_segments` to at
    /// least 2.
    pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let row = width_segments + 1;

        let mut geometry = Geometry::default();

        for iy in 0..=height_segments {
            let theta = iy as f32 / height_segments as f32 * PI;
            let (sin_theta, cos_theta) = theta.sin_cos();

            for ix in 0..=width_segments {
                let phi = ix as f32 / width_segments as f32 * TAU;
                let (sin_phi, cos_phi) = phi.sin_cos();
                let normal = Vec3::new(-cos_phi * sin_theta, cos_theta, sin_phi * sin_theta);

                geometry.positions.push(normal * radius);
                geometry.normals.push(normal);
            }
        }

        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;

                // Pole rows collapse to a point; skip their degenerate halves
                if iy != 0 {
                    geometry.indices.extend([a, b, d]);
                }
                if iy != height_segments - 1 {
                    geometry.indices.extend([b, c, d]);
                }
            }
        }

        geometry
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn bounds(&self) -> Option<AABB> {
        AABB::from_points(self.positions.iter().copied())
    }

    /// Iterate triangles as `[position; 3]` / `[normal; 3]` pairs
    pub fn triangles(&self) -> impl Iterator<Item = ([Vec3; 3], [Vec3; 3])> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            (
                [self.positions[i0], self.positions[i1], self.positions[i2]],
                [self.normals[i0], self.normals[i1], self.normals[i2]],
            )
        })
    }

    fn push_quad(&mut self, center: Vec3, u: Vec3, v: Vec3, normal: Vec3) {
        let base = self.positions.len() as u32;
        self.positions.extend([
            center - u - v,
            center + u - v,
            center + u + v,
            center - u + v,
        ]);
        self.normals.extend([normal; 4]);
        self.indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(p: &[Vec3; 3]) -> Vec3 {
        (p[1] - p[0]).cross(p[2] - p[0])
    }

    #[test]
    fn test_plane_faces_positive_z() {
        let plane = Geometry::plane(1.0, 1.6);
        assert_eq!(plane.triangle_count(), 2);
        for (positions, normals) in plane.triangles() {
            assert!(face_normal(&positions).normalize().abs_diff_eq(Vec3::Z, 1e-6));
            assert!(normals.iter().all(|n| *n == Vec3::Z));
        }
        let bounds = plane.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-0.5, -0.8, 0.0));
        assert_eq!(bounds.max, Vec3::new(0.5, 0.8, 0.0));
    }

    #[test]
    fn test_cuboid_winding_matches_normals() {
        let cuboid = Geometry::cuboid(4.0, 2.5, 4.0);
        assert_eq!(cuboid.triangle_count(), 12);
        assert_eq!(cuboid.vertex_count(), 24);
        for (positions, normals) in cuboid.triangles() {
            let n = face_normal(&positions).normalize();
            assert!(n.abs_diff_eq(normals[0], 1e-6), "{n} vs {}", normals[0]);
        }
    }

    #[test]
    fn test_cuboid_bounds() {
        let bounds = Geometry::cuboid(4.0, 2.5, 4.0).bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-2.0, -1.25, -2.0));
        assert_eq!(bounds.max, Vec3::new(2.0, 1.25, 2.0));
    }

    #[test]
    fn test_cone_square_pyramid() {
        let cone = Geometry::cone(3.5, 1.0, 4);
        // 4 side faces + 4 cap triangles
        assert_eq!(cone.triangle_count(), 8);

        let bounds = cone.bounds().unwrap();
        assert!((bounds.max.y - 0.5).abs() < 1e-6);
        assert!((bounds.min.y + 0.5).abs() < 1e-6);
        assert!((bounds.max.z - 3.5).abs() < 1e-5);
        assert!((bounds.max.x - 3.5).abs() < 1e-5);
    }

    #[test]
    fn test_cone_faces_point_outward() {
        let cone = Geometry::cone(2.0, 3.0, 12);
        let center = Vec3::ZERO;
        for (positions, _) in cone.triangles() {
            let centroid = (positions[0] + positions[1] + positions[2]) / 3.0;
            let n = face_normal(&positions);
            assert!(n.length() > 1e-6, "degenerate triangle");
            assert!(n.dot(centroid - center) > 0.0);
        }
    }

    #[test]
    fn test_cone_clamps_segments() {
        assert_eq!(Geometry::cone(1.0, 1.0, 1).triangle_count(), 6);
    }

    #[test]
    fn test_sphere_triangle_count() {
        // Two pole rows contribute one triangle per segment, the rest two
        let sphere = Geometry::uv_sphere(1.0, 16, 16);
        assert_eq!(sphere.triangle_count(), 16 * 2 * 16 - 2 * 16);
        assert_eq!(sphere.vertex_count(), 17 * 17);
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let sphere = Geometry::uv_sphere(0.35, 7, 5);
        for (p, n) in sphere.positions.iter().zip(&sphere.normals) {
            assert!((p.length() - 0.35).abs() < 1e-5);
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_sphere_faces_point_outward() {
        for (w, h) in [(5, 5), (9, 9), (5, 9), (16, 16)] {
            let sphere = Geometry::uv_sphere(1.0, w, h);
            for (positions, _) in sphere.triangles() {
                let centroid = (positions[0] + positions[1] + positions[2]) / 3.0;
                let n = face_normal(&positions);
                assert!(n.length() > 1e-6, "degenerate triangle in {w}x{h}");
                assert!(n.dot(centroid) > 0.0, "inward face in {w}x{h}");
            }
        }
    }

    #[test]
    fn test_sphere_clamps_segments() {
        let sphere = Geometry::uv_sphere(1.0, 0, 0);
        // 3 width segments, 2 height segments: both rows touch a pole
        assert_eq!(sphere.triangle_count(), 6);
    }
}
