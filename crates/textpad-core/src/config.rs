//! Editor configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use textpad_tabs::TabsConfig;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Tab controller settings
    pub tabs: TabsConfig,
}

impl Config {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        config.validate()?;

        tracing::debug!(path = %path.display(), "Loaded config");

        Ok(config)
    }

    /// Load `path`, falling back to defaults when the file does not exist
    pub fn load_or_default_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load the per-user config file, if any
    pub fn load_or_default() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_or_default_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("textpad").join("config.toml"))
    }

    fn validate(&self) -> Result<()> {
        if self.tabs.untitled_label.trim().is_empty() {
            return Err(CoreError::Config(
                "tabs.untitled_label cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            tabs: TabsConfig::default(),
        }
    }
}
