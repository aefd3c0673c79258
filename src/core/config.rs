pub mod animation;
pub mod summary;

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use self::{animation::Animation, summary::Summary};

/// Struct to hold the configuration of both visualization pipelines.
///
/// Contains fields for:
///
/// - `animation`: Parameters for the animated landscape GIF.
/// - `summary`: Parameters for the fitness summary plot over many runs.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub animation: Animation,
    pub summary: Summary,
}

impl Config {
    /// Reads a configuration from a TOML file.
    ///
    /// Missing sections and fields fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or parsed, including
    /// unknown benchmark names.
    #[tracing::instrument(level = "info")]
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading config.");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file '{}'", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Could not parse config file '{}'", path.display()))?;
        Ok(config)
    }

    /// Writes the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file can't be written.
    #[tracing::instrument(level = "info", skip(self))]
    pub fn save(&self, path: &Path) -> Result<()> {
        info!("Saving config.");
        let toml = toml::to_string(self).context("Failed to serialize config")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
        }
        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file '{}'", path.display()))?;
        Ok(())
    }
}
