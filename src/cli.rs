// cli.rs - Command-line interface configuration
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "haunted-house")]
#[command(about = "Haunted house diorama with orbit camera", long_about = None)]
pub struct Cli {
    /// Disable UI elements and console output
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// JSON file overriding the default scene settings
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seed for the rock layout (random every run when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of rocks to scatter
    #[arg(long)]
    pub rocks: Option<usize>,

    /// Disable shadow rays from the moon
    #[arg(long = "no-shadows", default_value = "false")]
    pub no_shadows: bool,

    /// Initial window width in logical pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial window height in logical pixels
    #[arg(long)]
    pub height: Option<u32>,
}

impl Cli {
    /// Load the config file if one was given, then apply flag overrides
    pub fn load_config(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        let config = self.apply(config);
        config.validate()?;
        Ok(config)
    }

    /// Flags take precedence over file values
    pub fn apply(&self, mut config: Config) -> Config {
        if self.no_ui {
            config.show_ui = false;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(count) = self.rocks {
            config.rocks.count = count;
        }
        if self.no_shadows {
            config.shadows.enabled = false;
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        config
    }
}
