//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the root configuration
//! from the configuration file (~/.config/persona-hub/config.toml) and layers
//! environment overrides on top of it.

use crate::paths::PersonaPaths;
use crate::storage::AtomicTomlFile;
use persona_core::config::RootConfig;
use persona_core::error::{PersonaError, Result};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

/// Environment variable overriding `storage.data_dir`.
pub const DATA_DIR_ENV: &str = "PERSONA_HUB_DATA_DIR";

/// Environment variable overriding `logging.level`.
pub const LOG_ENV: &str = "PERSONA_HUB_LOG";

/// Configuration service that loads and caches the root configuration.
///
/// The file is created with default contents on first access. A file that
/// cannot be parsed is reported and replaced by defaults in memory only.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Explicit config file location; the platform default when `None`.
    path: Option<PathBuf>,
    /// Cached configuration, loaded lazily on first access.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the platform default config file.
    pub fn new() -> Self {
        Self::with_path(None)
    }

    /// Creates a service reading `path` instead of the platform default.
    pub fn with_path(path: Option<PathBuf>) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Location of the config file.
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => PersonaPaths::config_file().map_err(|e| PersonaError::config(e.to_string())),
        }
    }

    /// Gets the root configuration with environment overrides applied.
    pub fn get_config(&self) -> RootConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let effective = apply_env_overrides(self.load_or_default(), |key| std::env::var(key).ok());

        {
            let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
            *write_lock = Some(effective.clone());
        }

        effective
    }

    /// Loads the config file, falling back to defaults if it cannot be read.
    fn load_or_default(&self) -> RootConfig {
        match self.load_config() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load configuration, using defaults");
                RootConfig::default()
            }
        }
    }

    /// Loads the config file, writing the default document if it is missing.
    fn load_config(&self) -> Result<RootConfig> {
        let path = self.config_path()?;
        let config = AtomicTomlFile::<RootConfig>::new(path.clone()).load_or_init(RootConfig::default())?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies `PERSONA_HUB_DATA_DIR` and `PERSONA_HUB_LOG` from `lookup`.
///
/// Empty values are ignored.
pub fn apply_env_overrides<F>(mut config: RootConfig, lookup: F) -> RootConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
        config.storage.data_dir = Some(PathBuf::from(dir));
    }
    if let Some(level) = lookup(LOG_ENV).filter(|v| !v.trim().is_empty()) {
        config.logging.level = level;
    }
    config
}
