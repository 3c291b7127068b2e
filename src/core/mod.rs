pub mod bvh;
pub mod clock;
pub mod controller;
pub mod input_adapter;
pub mod timer;
pub mod triangle_intersection;

pub use bvh::{Bvh, RayHit};
pub use clock::Clock;
pub use controller::{Button, Controller};
pub use input_adapter::WinitController;
pub use timer::FpsCounter;
pub use triangle_intersection::TriangleIntersection;
