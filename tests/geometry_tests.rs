use glam::Vec3;
use haunted_house::geometry::Geometry;

#[cfg(test)]
mod geometry_tests {
    use super::*;

    fn assert_outward(geometry: &Geometry) {
        let center = geometry.bounds().unwrap().center();
        for ([a, b, c], _) in geometry.triangles() {
            let face_normal = (b - a).cross(c - a);
            if face_normal.length_squared() < 1e-12 {
                continue;
            }
            let centroid = (a + b + c) / 3.0;
            assert!(
                face_normal.dot(centroid - center) > 0.0,
                "inward-facing triangle at {centroid}"
            );
        }
    }

    #[test]
    fn test_house_walls_bounds() {
        let walls = Geometry::cuboid(4.0, 2.5, 4.0);
        let bounds = walls.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-2.0, -1.25, -2.0));
        assert_eq!(bounds.max, Vec3::new(2.0, 1.25, 2.0));
        assert_eq!(walls.triangle_count(), 12);
        assert_outward(&walls);
    }

    #[test]
    fn test_roof_pyramid() {
        let roof = Geometry::cone(3.5, 1.0, 4);
        // 4 sides + 4 cap triangles
        assert_eq!(roof.triangle_count(), 8);

        let bounds = roof.bounds().unwrap();
        assert!((bounds.max.y - 0.5).abs() < 1e-6);
        assert!((bounds.min.y + 0.5).abs() < 1e-6);
        assert!((bounds.max.z - 3.5).abs() < 1e-5);
        assert!((bounds.max.x - 3.5).abs() < 1e-5);
        assert_outward(&roof);
    }

    #[test]
    fn test_bush_sphere() {
        let bush = Geometry::uv_sphere(1.0, 16, 16);
        assert_eq!(bush.vertex_count(), 17 * 17);
        assert_eq!(bush.triangle_count(), 480);

        for (p, n) in bush.positions.iter().zip(&bush.normals) {
            assert!((p.length() - 1.0).abs() < 1e-5);
            assert!(p.abs_diff_eq(*n, 1e-5));
        }
        assert_outward(&bush);
    }

    #[test]
    fn test_low_resolution_rock() {
        let rock = Geometry::uv_sphere(0.3, 5, 5);
        assert_eq!(rock.triangle_count(), 5 * 4 * 2);
        assert_outward(&rock);

        let bounds = rock.bounds().unwrap();
        assert!((bounds.max.y - 0.3).abs() < 1e-6);
        assert!((bounds.min.y + 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_floor_plane() {
        let floor = Geometry::plane(50.0, 50.0);
        assert_eq!(floor.triangle_count(), 2);
        assert!(floor.normals.iter().all(|n| *n == Vec3::Z));

        let bounds = floor.bounds().unwrap();
        assert_eq!(bounds.size(), Vec3::new(50.0, 50.0, 0.0));
    }

    #[test]
    fn test_degenerate_segment_counts_are_clamped() {
        let cone = Geometry::cone(1.0, 1.0, 1);
        assert_eq!(cone.triangle_count(), 6);

        let sphere = Geometry::uv_sphere(1.0, 0, 0);
        assert_eq!(sphere.triangle_count(), 6);
    }
}
