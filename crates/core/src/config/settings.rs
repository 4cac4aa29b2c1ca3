// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon settings
//!
//! Loaded from `$XDG_CONFIG_HOME/keepawake/config.toml` unless `KAD_CONFIG`
//! points elsewhere. A missing file means defaults.

use crate::backend::BackendId;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "KAD_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Application name passed to every backend
    pub app_id: String,
    /// Default inhibit reason
    pub reason: String,
    /// Request inhibition as soon as the daemon starts
    pub inhibit_on_start: bool,
    /// Backends that are never connected and always report unavailable
    pub disabled_backends: Vec<BackendId>,
    /// Also write logs to this file
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_id: "kad".to_string(),
            reason: "Keeping the system awake".to_string(),
            inhibit_on_start: true,
            disabled_backends: Vec::new(),
            log_file: None,
        }
    }
}

impl Config {
    /// Location of the config file: `KAD_CONFIG`, then the XDG config dir
    pub fn resolve_path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        dirs::config_dir()
            .map(|dir| dir.join("keepawake").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load the config at `path`, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn is_enabled(&self, backend: BackendId) -> bool {
        !self.disabled_backends.contains(&backend)
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
