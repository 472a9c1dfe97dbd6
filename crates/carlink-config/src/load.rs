//! Config loading, env overrides, and validation.

use crate::{ClientConfig, ConfigError};
use directories::ProjectDirs;
use log::{debug, info};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the backend base URL.
pub const BACKEND_URL_ENV: &str = "CARLINK_BACKEND_URL";

impl ClientConfig {
    /// Load a config from a JSON5 file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load a config from JSON5 contents.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        let config: ClientConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides on top of the loaded values.
    ///
    /// Currently only the backend base URL can be overridden, via
    /// `CARLINK_BACKEND_URL`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var(BACKEND_URL_ENV) {
            self.apply_base_url_override(&value);
        }
    }

    /// Replace the backend base URL unless the override is empty.
    pub fn apply_base_url_override(&mut self, base_url: &str) {
        let base_url = base_url.trim();
        if base_url.is_empty() {
            return;
        }
        info!("overriding backend base url (value={})", base_url);
        self.backend.base_url = base_url.to_string();
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                path: "backend.base_url".to_string(),
                message: "base url must not be empty".to_string(),
            });
        }
        if self.channel.buffer == 0 {
            return Err(ConfigError::InvalidField {
                path: "channel.buffer".to_string(),
                message: "channel buffer must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Default location for the persisted session snapshot.
pub fn default_cache_path() -> Option<PathBuf> {
    ProjectDirs::from("app", "carlink", "carlink")
        .map(|dirs| dirs.data_dir().join("session.json"))
}
