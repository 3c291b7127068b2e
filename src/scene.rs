use glam::{Affine3A, EulerRot, Mat3, Quat, Vec3};
use std::sync::Arc;

use crate::geometry::Geometry;
use crate::light::{AmbientLight, DirectionalLight, Light};
use crate::math::Color;
use crate::types::{
    MaterialData, TriangleData, FLAG_CAST_SHADOW, FLAG_DOUBLE_SIDED, FLAG_RECEIVE_SHADOW,
};

/// Position, orientation and scale of a node relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Replace the rotation with intrinsic X, then Y, then Z Euler angles
    pub fn with_euler(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
        self
    }

    /// Rotate about the node's own Y axis on top of the current rotation
    pub fn rotate_y(mut self, angle: f32) -> Self {
        self.rotation = self.rotation * Quat::from_rotation_y(angle);
        self
    }

    /// Local-to-parent matrix: translate * rotate * scale
    pub fn matrix(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Which faces of a surface are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// Flat-colored surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub side: Side,
}

impl Material {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            side: Side::Front,
        }
    }

    pub fn double_sided(mut self) -> Self {
        self.side = Side::Double;
        self
    }

    pub fn to_gpu(&self) -> MaterialData {
        MaterialData {
            color: self.color.to_array(),
            double_sided: (self.side == Side::Double) as u32,
        }
    }
}

/// Index into [`Scene::materials`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub geometry: Arc<Geometry>,
    pub material: MaterialId,
    pub transform: Transform,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(name: impl Into<String>, geometry: Arc<Geometry>, material: MaterialId) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            transform: Transform::IDENTITY,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn casting_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    pub fn receiving_shadow(mut self) -> Self {
        self.receive_shadow = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Group {
    pub name: String,
    pub transform: Transform,
    pub children: Vec<Node>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add(&mut self, node: impl Into<Node>) -> &mut Self {
        self.children.push(node.into());
        self
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Mesh(Mesh),
    Group(Group),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Mesh(mesh) => &mesh.name,
            Node::Group(group) => &group.name,
        }
    }

    fn find(&self, name: &str) -> Option<&Node> {
        if self.name() == name {
            return Some(self);
        }
        match self {
            Node::Mesh(_) => None,
            Node::Group(group) => group.children.iter().find_map(|child| child.find(name)),
        }
    }

    fn collect_meshes<'a>(&'a self, parent: Affine3A, out: &mut Vec<(Affine3A, &'a Mesh)>) {
        match self {
            Node::Mesh(mesh) => out.push((parent * mesh.transform.matrix(), mesh)),
            Node::Group(group) => {
                let world = parent * group.transform.matrix();
                for child in &group.children {
                    child.collect_meshes(world, out);
                }
            }
        }
    }
}

impl From<Mesh> for Node {
    fn from(mesh: Mesh) -> Self {
        Node::Mesh(mesh)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

/// Linear fog blended by view depth between `near` and `far`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    pub fn new(color: Color, near: f32, far: f32) -> Self {
        Self { color, near, far }
    }

    /// Blend weight toward the fog color at a view depth (smoothstep falloff)
    pub fn factor(&self, depth: f32) -> f32 {
        let t = ((depth - self.near) / (self.far - self.near)).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }
}

/// Root of the scene graph plus the materials, lights and atmosphere it uses
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub root: Group,
    pub materials: Vec<Material>,
    pub lights: Vec<Light>,
    pub fog: Option<Fog>,
    pub background: Color,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            root: Group::new("scene"),
            background: Color::BLACK,
            ..Default::default()
        }
    }

    pub fn add(&mut self, node: impl Into<Node>) -> &mut Self {
        self.root.add(node);
        self
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() as u32 - 1)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize)
    }

    pub fn add_light(&mut self, light: Light) -> &mut Self {
        self.lights.push(light);
        self
    }

    /// Depth-first search for a node by name
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.root.children.iter().find_map(|child| child.find(name))
    }

    /// Every mesh with its world transform
    pub fn meshes(&self) -> Vec<(Affine3A, &Mesh)> {
        let mut out = Vec::new();
        let root = self.root.transform.matrix();
        for child in &self.root.children {
            child.collect_meshes(root, &mut out);
        }
        out
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes().len()
    }

    /// Summed ambient contribution
    pub fn ambient(&self) -> AmbientLight {
        self.lights
            .iter()
            .filter_map(|light| match light {
                Light::Ambient(ambient) => Some(ambient),
                Light::Directional(_) => None,
            })
            .fold(AmbientLight::new(Color::BLACK, 1.0), |acc, light| {
                let c = light.color;
                let i = light.intensity;
                AmbientLight::new(
                    Color::new(
                        acc.color.r + c.r * i,
                        acc.color.g + c.g * i,
                        acc.color.b + c.b * i,
                    ),
                    1.0,
                )
            })
    }

    /// First directional light; the shading pass supports exactly one
    pub fn directional(&self) -> Option<&DirectionalLight> {
        self.lights.iter().find_map(|light| match light {
            Light::Directional(directional) => Some(directional),
            Light::Ambient(_) => None,
        })
    }

    /// World-space triangles of every mesh, flagged for shadows and sidedness
    pub fn triangles(&self) -> Vec<TriangleData> {
        self.meshes()
            .into_iter()
            .flat_map(|(world, mesh)| {
                let normal_matrix = Mat3::from(world.matrix3).inverse().transpose();
                let double_sided = self
                    .material(mesh.material)
                    .is_some_and(|m| m.side == Side::Double);
                let flags = (mesh.cast_shadow as u32 * FLAG_CAST_SHADOW)
                    | (mesh.receive_shadow as u32 * FLAG_RECEIVE_SHADOW)
                    | (double_sided as u32 * FLAG_DOUBLE_SIDED);
                let material = mesh.material.0;

                mesh.geometry.triangles().map(move |(positions, normals)| {
                    TriangleData::new(
                        positions.map(|p| world.transform_point3(p)),
                        normals.map(|n| (normal_matrix * n).normalize_or(n)),
                        material,
                        flags,
                    )
                })
            })
            .collect()
    }

    pub fn gpu_materials(&self) -> Vec<MaterialData> {
        self.materials.iter().map(Material::to_gpu).collect()
    }
}
