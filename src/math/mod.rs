mod aabb;
mod color;
mod ray;

pub use aabb::AABB;
pub use color::Color;
pub use ray::{intersect_aabb, inverse_direction};
