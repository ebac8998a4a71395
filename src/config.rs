use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_DESTINATION_URL: &str = "https://binimum.org/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where the user eventually ends up.
    #[serde(default = "default_destination_url")]
    pub destination_url: String,
    /// Engine tick cadence. The stages are calibrated for 1000; smaller
    /// values speed the whole sequence up proportionally.
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

fn default_destination_url() -> String {
    DEFAULT_DESTINATION_URL.to_string()
}

fn default_tick_millis() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            destination_url: default_destination_url(),
            tick_millis: default_tick_millis(),
        }
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            // Use XDG config directory on Linux
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("stall-cli")
        } else {
            // Use home directory with dot prefix on Windows/Mac
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".stall-cli")
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {config_dir:?}"))?;
            info!("Created config directory: {config_dir:?}");
        }

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        debug!("Loading config from: {config_path:?}");

        if !config_path.exists() {
            info!("Config file doesn't exist, using defaults");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {config_path:?}"))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {config_path:?}"))?;

        debug!(
            "Loaded config: destination {} at {} ms/tick",
            config.destination_url, config.tick_millis
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        let config_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        fs::write(&config_path, config_content)
            .with_context(|| format!("Failed to write config file: {config_path:?}"))?;
        debug!("Saved config to: {config_path:?}");
        Ok(())
    }
}
