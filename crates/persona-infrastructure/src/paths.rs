//! Unified path management for Persona Hub files.
//!
//! Platform directories are resolved via `AppPaths` from the version-migrate
//! crate so that the storage layer and path lookups agree on every platform
//! (Linux, macOS, Windows).

use std::path::{Path, PathBuf};
use version_migrate::{AppPaths, PathStrategy};

/// Application name used for platform directories.
pub const APP_NAME: &str = "persona-hub";

/// Subdirectory holding template files.
pub const TEMPLATES_DIR: &str = "templates";

/// Subdirectory holding instance files.
pub const INSTANCES_DIR: &str = "instances";

/// Errors that can occur during path resolution.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Home directory could not be determined.
    #[error("Cannot find home directory")]
    HomeDirNotFound,

    /// A custom base directory could not be used.
    #[error("Invalid data directory {path}: {reason}")]
    InvalidDataDir { path: PathBuf, reason: String },
}

/// Path resolution for Persona Hub.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/persona-hub/       # Config directory (AppPaths default)
/// └── config.toml              # Application configuration
///
/// ~/.local/share/persona-hub/  # Data directory (or a custom base)
/// ├── templates/               # One file per user template
/// └── instances/               # One file per instance
/// ```
#[derive(Debug, Clone, Default)]
pub struct PersonaPaths {
    base_dir: Option<PathBuf>,
}

impl PersonaPaths {
    /// Creates a resolver. A `base_dir` replaces the platform data directory.
    pub fn new(base_dir: Option<&Path>) -> Self {
        Self {
            base_dir: base_dir.map(Path::to_path_buf),
        }
    }

    /// Returns `AppPaths` whose data directory is exactly [`Self::data_dir`].
    ///
    /// `AsyncDirStorage` stores entities under `app_paths.data_dir()/<domain>`,
    /// and `PathStrategy::CustomBase(base)` resolves to `base/data/<app>`.
    /// Passing the absolute data directory as the application name makes that
    /// join collapse back onto the data directory itself.
    pub fn storage_paths(&self) -> Result<AppPaths, PathError> {
        let data_dir = self.data_dir()?;
        let app_name = data_dir
            .to_str()
            .ok_or_else(|| PathError::InvalidDataDir {
                path: data_dir.clone(),
                reason: "path is not valid UTF-8".to_string(),
            })?
            .to_string();

        Ok(AppPaths::new(app_name).data_strategy(PathStrategy::CustomBase(data_dir)))
    }

    /// Returns the Persona Hub configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        AppPaths::new(APP_NAME)
            .config_dir()
            .map_err(|_| PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the data directory: the custom base if set, else the platform one.
    ///
    /// A relative custom base is resolved against the current directory.
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_dir {
            Some(base) => std::path::absolute(base).map_err(|e| PathError::InvalidDataDir {
                path: base.clone(),
                reason: e.to_string(),
            }),
            None => AppPaths::new(APP_NAME)
                .data_dir()
                .map_err(|_| PathError::HomeDirNotFound),
        }
    }

    /// Returns the directory holding template files.
    pub fn templates_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join(TEMPLATES_DIR))
    }

    /// Returns the directory holding instance files.
    pub fn instances_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join(INSTANCES_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file() {
        let config_file = PersonaPaths::config_file().unwrap();
        assert!(config_file.ends_with("config.toml"));
        let config_dir = PersonaPaths::config_dir().unwrap();
        assert!(config_file.starts_with(&config_dir));
    }

    #[test]
    fn test_default_data_dir() {
        let data_dir = PersonaPaths::default().data_dir().unwrap();
        assert!(data_dir.ends_with(APP_NAME));
    }

    #[test]
    fn test_storage_paths_resolve_to_data_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let paths = PersonaPaths::new(Some(temp_dir.path()));

        let storage_data_dir = paths.storage_paths().unwrap().data_dir().unwrap();
        assert_eq!(storage_data_dir, paths.data_dir().unwrap());
        assert!(!temp_dir.path().join("data").exists());
    }

    #[test]
    fn test_relative_base_dir_is_made_absolute() {
        let paths = PersonaPaths::new(Some(Path::new("personas")));
        let data_dir = paths.data_dir().unwrap();
        assert!(data_dir.is_absolute());
        assert!(data_dir.ends_with("personas"));
    }

    #[test]
    fn test_custom_base_dir() {
        let base = PathBuf::from("/tmp/persona-hub-test");
        let paths = PersonaPaths::new(Some(&base));
        assert_eq!(paths.data_dir().unwrap(), base);
        assert_eq!(paths.templates_dir().unwrap(), base.join("templates"));
        assert_eq!(paths.instances_dir().unwrap(), base.join("instances"));
    }
}
