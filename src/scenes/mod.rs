mod haunted_house;
mod rocks;

pub use haunted_house::create_haunted_house_scene;
pub use rocks::{RockPlacement, RockScatter};
