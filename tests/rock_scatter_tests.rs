use glam::Vec3;
use haunted_house::config::Config;
use haunted_house::scene::Node;
use haunted_house::scenes::{create_haunted_house_scene, RockScatter};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[cfg(test)]
mod rock_scatter_tests {
    use super::*;

    #[test]
    fn test_same_seed_same_layout() {
        let scatter = RockScatter::default();
        let a = scatter.sample(&mut StdRng::seed_from_u64(2024));
        let b = scatter.sample(&mut StdRng::seed_from_u64(2024));
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let scatter = RockScatter::default();
        let a = scatter.sample(&mut StdRng::seed_from_u64(1));
        let b = scatter.sample(&mut StdRng::seed_from_u64(2));
        assert_ne!(a, b);
    }

    #[test]
    fn test_rocks_stay_outside_house() {
        let rocks = RockScatter::default().sample(&mut StdRng::seed_from_u64(99));
        for rock in rocks {
            let planar = Vec3::new(rock.position.x, 0.0, rock.position.z).length();
            assert!(planar >= 5.0 - 1e-4);
            assert!(planar < 17.0 + 1e-4);
        }
    }

    #[test]
    fn test_custom_ranges() {
        let scatter = RockScatter {
            count: 25,
            radius: 1.0..1.5,
            segments: 3..=3,
            distance: 2.0..3.0,
            tilt: 0.0,
        };
        let rocks = scatter.sample(&mut StdRng::seed_from_u64(5));

        assert_eq!(rocks.len(), 25);
        for rock in rocks {
            assert!((1.0..1.5).contains(&rock.radius));
            assert_eq!(rock.width_segments, 3);
            assert_eq!(rock.height_segments, 3);
            assert!((2.0..3.0).contains(&rock.distance));
            assert_eq!(rock.rotation, Vec3::ZERO);
        }
    }

    #[test]
    fn test_rock_meshes_match_placements() {
        let config = Config::default();
        let placements = config.rocks.sample(&mut StdRng::seed_from_u64(77));

        // The scene draws from the generator in the same order as a bare sample
        let scene = create_haunted_house_scene(&config, &mut StdRng::seed_from_u64(77));
        let Some(Node::Group(rocks)) = scene.find("rocks") else {
            panic!("rocks group missing");
        };

        assert_eq!(rocks.children.len(), placements.len());
        for (node, placement) in rocks.children.iter().zip(&placements) {
            let Node::Mesh(mesh) = node else {
                panic!("rock is not a mesh");
            };
            assert!(mesh.cast_shadow);
            assert_eq!(mesh.transform.position, placement.position);

            let expected_triangles =
                placement.width_segments as usize * (placement.height_segments as usize - 1) * 2;
            assert_eq!(mesh.geometry.triangle_count(), expected_triangles);

            let bounds = mesh.geometry.bounds().unwrap();
            assert!((bounds.max.y - placement.radius).abs() < 1e-5);
        }
    }

    #[test]
    fn test_all_rocks_share_material() {
        let scene = create_haunted_house_scene(&Config::default(), &mut StdRng::seed_from_u64(8));
        let Some(Node::Group(rocks)) = scene.find("rocks") else {
            panic!("rocks group missing");
        };

        let materials: Vec<_> = rocks
            .children
            .iter()
            .map(|node| match node {
                Node::Mesh(mesh) => mesh.material,
                Node::Group(_) => panic!("unexpected group"),
            })
            .collect();
        assert!(materials.windows(2).all(|w| w[0] == w[1]));
    }
}
