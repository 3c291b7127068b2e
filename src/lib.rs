pub mod app;
pub mod camera;
pub mod cli;
pub mod config;
pub mod controls;
pub mod core;
pub mod geometry;
pub mod light;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod scenes;
pub mod types;

pub use scenes::create_haunted_house_scene;
