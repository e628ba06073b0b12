use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::azure::cli::AZ_PROGRAM;
use crate::azure::runner::DEFAULT_TIMEOUT;

pub const CONFIG_FILENAME: &str = ".azcli-wrap.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// az binary to invoke
    #[serde(default = "default_az_path")]
    pub az_path: String,
    /// Per-command timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub resource_group: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub sql_server: Option<String>,
}

fn default_az_path() -> String {
    AZ_PROGRAM.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            az_path: default_az_path(),
            timeout_secs: default_timeout_secs(),
            resource_group: None,
            location: None,
            sql_server: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        load_config_from_path(CONFIG_FILENAME)
    }

    pub fn save(&self) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(CONFIG_FILENAME, content)?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Invalid config in {}", path.as_ref().display()))?;
    Ok(config)
}

/// Config from the working directory, or defaults if there is none.
/// An existing but invalid file is still an error.
pub fn try_load_config() -> Result<Config> {
    try_load_config_from_path(CONFIG_FILENAME)
}

pub fn try_load_config_from_path(path: impl AsRef<Path>) -> Result<Config> {
    if !path.as_ref().exists() {
        return Ok(Config::default());
    }
    load_config_from_path(path)
}
