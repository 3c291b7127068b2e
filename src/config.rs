use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::math::Color;
use crate::scenes::RockScatter;

const NIGHT: Color = Color::from_hex(0x262837);
const MOONLIGHT: Color = Color::from_hex(0xb9d5ff);

/// Runtime settings. Every field has a default, so a JSON file only needs the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub background: Color,
    pub fog: FogConfig,
    pub ambient: LightConfig,
    pub moon: MoonConfig,
    pub shadows: ShadowConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub rocks: RockScatter,
    /// Fixed seed for the rock layout; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Upper bound on the device pixel ratio used for the render resolution
    pub max_pixel_ratio: f32,
    pub show_ui: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    pub enabled: bool,
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub color: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MoonConfig {
    pub color: Color,
    pub intensity: f32,
    pub position: [f32; 3],
    pub cast_shadow: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    pub enabled: bool,
    /// Shadow rays per receiving pixel
    pub samples: u32,
    /// Half-angle of the jitter cone in radians
    pub softness: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            background: NIGHT,
            fog: FogConfig::default(),
            ambient: LightConfig::default(),
            moon: MoonConfig::default(),
            shadows: ShadowConfig::default(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            rocks: RockScatter::default(),
            seed: None,
            max_pixel_ratio: 2.0,
            show_ui: true,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: NIGHT,
            near: 1.0,
            far: 15.0,
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: MOONLIGHT,
            intensity: 1.0,
        }
    }
}

impl Default for MoonConfig {
    fn default() -> Self {
        Self {
            color: MOONLIGHT,
            intensity: 0.2,
            position: [4.0, 5.0, -2.0],
            cast_shadow: true,
        }
    }
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            samples: 4,
            softness: 0.02,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 100.0,
            position: [4.0, 2.0, 5.0],
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            min_distance: 5.0,
            max_distance: 10.0,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
        }
    }
}

impl Config {
    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.window.width > 0 && self.window.height > 0,
            "window size {}x{} must be non-zero",
            self.window.width,
            self.window.height
        );
        ensure!(
            self.fog.near < self.fog.far,
            "fog near ({}) must be less than fog far ({})",
            self.fog.near,
            self.fog.far
        );
        ensure!(
            self.shadows.samples > 0,
            "shadow samples must be at least 1"
        );
        ensure!(
            self.shadows.softness >= 0.0,
            "shadow softness {} is negative",
            self.shadows.softness
        );
        ensure!(
            self.camera.fov > 0.0 && self.camera.fov < 180.0,
            "camera fov {} must be in (0, 180) degrees",
            self.camera.fov
        );
        ensure!(
            self.camera.near > 0.0 && self.camera.near < self.camera.far,
            "camera near ({}) must be positive and less than far ({})",
            self.camera.near,
            self.camera.far
        );
        ensure!(
            self.controls.min_distance <= self.controls.max_distance,
            "controls min_distance ({}) exceeds max_distance ({})",
            self.controls.min_distance,
            self.controls.max_distance
        );
        ensure!(
            (0.0..=1.0).contains(&self.controls.damping_factor),
            "damping factor {} must be in [0, 1]",
            self.controls.damping_factor
        );
        ensure!(
            self.max_pixel_ratio > 0.0,
            "max pixel ratio must be positive"
        );
        self.rocks.validate().context("Invalid rock scatter")
    }
}
