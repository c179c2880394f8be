//! Plugin configuration file.
//!
//! A flat key/value store persisted as TOML next to the plugin binary,
//! for values the plugin wants to keep across restarts (the host never
//! sees this file; host-managed settings arrive over the socket instead).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or storing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML.
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The values could not be serialized.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Flat string key/value configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginConfig {
    values: BTreeMap<String, String>,

    /// Where the config was loaded from; used by [`store`](Self::store).
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl PluginConfig {
    /// Load from a TOML file. A missing file yields an empty config that
    /// will be created on the first store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str::<Self>(&content)?
        } else {
            Self::default()
        };
        config.path = Some(path);
        Ok(config)
    }

    /// The backing file path, if loaded from one.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value for a key, falling back to a default.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Set a key, returning the previous value if any.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// Remove a key, returning its value if present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Persist to the file the config was loaded from.
    pub fn store(&self) -> Result<(), ConfigError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        let content = toml::to_string_pretty(&self.values)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
