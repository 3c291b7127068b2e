use glam::Vec3;
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::sync::Arc;

use crate::config::Config;
use crate::geometry::Geometry;
use crate::light::{AmbientLight, DirectionalLight, Light};
use crate::math::Color;
use crate::scene::{Fog, Group, Material, Mesh, Scene, Transform};

use super::rocks::RockPlacement;

const WALL_COLOR: &str = "#ac8e82";
const ROOF_COLOR: &str = "#b35f45";
const DOOR_COLOR: &str = "#aa7b7d";
// Five hex digits: not a valid color, renders white
const WINDOW_COLOR: &str = "#45b93";
const BUSH_COLOR: &str = "#89c854";
const ROCK_COLOR: &str = "#b2b6b1";
const FLOOR_COLOR: &str = "#a9c388";

/// (scale, position) of each bush in front of the door
const BUSHES: [(f32, Vec3); 4] = [
    (0.5, Vec3::new(0.8, 0.2, 2.2)),
    (0.25, Vec3::new(1.4, 0.1, 2.1)),
    (0.4, Vec3::new(-0.8, 0.1, 2.1)),
    (0.15, Vec3::new(-1.0, 0.05, 2.6)),
];

/// Assemble the diorama: house, rock ring, floor, lights and fog.
pub fn create_haunted_house_scene<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Scene {
    let mut scene = Scene::new();
    scene.background = config.background;
    if config.fog.enabled {
        scene.fog = Some(Fog::new(config.fog.color, config.fog.near, config.fog.far));
    }

    let house = build_house(&mut scene);
    scene.add(house);

    let rocks = build_rocks(&mut scene, &config.rocks.sample(rng));
    scene.add(rocks);

    let floor_material =
        scene.add_material(Material::new(Color::parse_or_white(FLOOR_COLOR)).double_sided());
    scene.add(
        Mesh::new("floor", Arc::new(Geometry::plane(50.0, 50.0)), floor_material)
            .with_transform(Transform::IDENTITY.with_euler(-FRAC_PI_2, 0.0, 0.0))
            .receiving_shadow(),
    );

    scene.add_light(Light::Ambient(AmbientLight::new(
        config.ambient.color,
        config.ambient.intensity,
    )));

    let mut moon = DirectionalLight::new(config.moon.color, config.moon.intensity);
    moon.position = Vec3::from_array(config.moon.position);
    moon.cast_shadow = config.moon.cast_shadow;
    scene.add_light(Light::Directional(moon));

    log::info!(
        "Haunted house scene: {} meshes, {} rocks",
        scene.mesh_count(),
        config.rocks.count
    );
    scene
}

fn build_house(scene: &mut Scene) -> Group {
    let mut house = Group::new("house");

    let walls = scene.add_material(Material::new(Color::parse_or_white(WALL_COLOR)));
    house.add(
        Mesh::new("walls", Arc::new(Geometry::cuboid(4.0, 2.5, 4.0)), walls)
            .with_transform(Transform::from_position(Vec3::new(0.0, 1.25, 0.0)))
            .casting_shadow(),
    );

    let roof = scene.add_material(Material::new(Color::parse_or_white(ROOF_COLOR)));
    house.add(
        Mesh::new("roof", Arc::new(Geometry::cone(3.5, 1.0, 4)), roof).with_transform(
            Transform::from_position(Vec3::new(0.0, 3.0, 0.0)).with_euler(0.0, FRAC_PI_4, 0.0),
        ),
    );

    let door = scene.add_material(Material::new(Color::parse_or_white(DOOR_COLOR)));
    house.add(
        Mesh::new("door", Arc::new(Geometry::plane(1.0, 1.6)), door)
            .with_transform(Transform::from_position(Vec3::new(0.0, 0.8, 2.01))),
    );

    let window_geometry = Arc::new(Geometry::plane(1.0, 1.0));
    let window = scene.add_material(Material::new(Color::parse_or_white(WINDOW_COLOR)));
    house.add(
        Mesh::new("window_east", window_geometry.clone(), window).with_transform(
            Transform::from_position(Vec3::new(2.01, 1.2, 0.0)).rotate_y(FRAC_PI_2),
        ),
    );
    house.add(
        Mesh::new("window_west", window_geometry, window).with_transform(
            Transform::from_position(Vec3::new(-2.01, 1.2, 0.0)).rotate_y(-FRAC_PI_2),
        ),
    );

    let bush_geometry = Arc::new(Geometry::uv_sphere(1.0, 16, 16));
    let bush = scene.add_material(Material::new(Color::parse_or_white(BUSH_COLOR)));
    for (i, (scale, position)) in BUSHES.into_iter().enumerate() {
        house.add(
            Mesh::new(format!("bush_{i}"), bush_geometry.clone(), bush)
                .with_transform(Transform::from_position(position).with_scale(scale))
                .casting_shadow(),
        );
    }

    house
}

fn build_rocks(scene: &mut Scene, placements: &[RockPlacement]) -> Group {
    let mut rocks = Group::new("rocks");
    let material = scene.add_material(Material::new(Color::parse_or_white(ROCK_COLOR)));

    for (i, rock) in placements.iter().enumerate() {
        let geometry = Geometry::uv_sphere(rock.radius, rock.width_segments, rock.height_segments);
        let transform = Transform::from_position(rock.position).with_euler(
            rock.rotation.x,
            rock.rotation.y,
            rock.rotation.z,
        );
        rocks.add(
            Mesh::new(format!("rock_{i}"), Arc::new(geometry), material)
                .with_transform(transform)
                .casting_shadow(),
        );
    }

    rocks
}
