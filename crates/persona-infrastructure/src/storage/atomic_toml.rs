//! Atomic TOML file operations.
//!
//! Used for `config.toml`: small documents read at startup and occasionally
//! rewritten, where a torn write would leave the application unconfigurable.

use persona_core::PersonaError;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during atomic TOML operations.
#[derive(Debug, Error)]
pub enum AtomicTomlError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<AtomicTomlError> for PersonaError {
    fn from(err: AtomicTomlError) -> Self {
        match err {
            AtomicTomlError::Io { .. } | AtomicTomlError::Lock(_) => {
                PersonaError::io(err.to_string())
            }
            AtomicTomlError::Parse { .. } | AtomicTomlError::Serialize(_) => {
                PersonaError::Serialization {
                    format: "TOML".to_string(),
                    message: err.to_string(),
                }
            }
        }
    }
}

/// A handle to a TOML file that is replaced atomically on every write.
///
/// - **Atomicity**: tmp file + rename in the same directory
/// - **Isolation**: `load_or_init` holds an exclusive `fs2` lock on a sibling `.lock` file
/// - **Durability**: fsync before rename
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    fn io_err(&self, source: std::io::Error) -> AtomicTomlError {
        AtomicTomlError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Loads and deserializes the file.
    ///
    /// Returns `Ok(None)` if the file doesn't exist or is blank.
    pub fn load(&self) -> Result<Option<T>, AtomicTomlError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.io_err(e))?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        toml::from_str(&content)
            .map(Some)
            .map_err(|source| AtomicTomlError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Serializes `data` and atomically replaces the file.
    pub fn save(&self, data: &T) -> Result<(), AtomicTomlError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        let toml_string = toml::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path).map_err(|e| self.io_err(e))?;
        tmp_file
            .write_all(toml_string.as_bytes())
            .map_err(|e| self.io_err(e))?;
        tmp_file.sync_all().map_err(|e| self.io_err(e))?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_err(e))?;
        Ok(())
    }

    /// Loads the file, writing `default_value` first if it is missing.
    pub fn load_or_init(&self, default_value: T) -> Result<T, AtomicTomlError> {
        let _lock = FileLock::acquire(&self.path)?;
        match self.load()? {
            Some(data) => Ok(data),
            None => {
                self.save(&default_value)?;
                Ok(default_value)
            }
        }
    }

    fn temp_path(&self) -> Result<PathBuf, AtomicTomlError> {
        let invalid = |msg: &str| {
            self.io_err(std::io::Error::new(std::io::ErrorKind::InvalidInput, msg))
        };
        let parent = self
            .path
            .parent()
            .ok_or_else(|| invalid("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| invalid("Path has no file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// Exclusive lock on `<file>.lock`, released when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicTomlError> {
        let lock_path = path.with_extension("lock");
        let io_err = |source| AtomicTomlError::Io {
            path: lock_path.clone(),
            source,
        };

        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(io_err)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| AtomicTomlError::Lock(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock happens when the handle closes; the file itself is best-effort cleanup
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Settings {
        level: String,
        retries: u32,
    }

    fn settings() -> Settings {
        Settings {
            level: "info".to_string(),
            retries: 0,
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Settings>::new(temp_dir.path().join("missing.toml"));
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_load_or_init_writes_default_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let file = AtomicTomlFile::<Settings>::new(path.clone());

        assert_eq!(file.load_or_init(settings()).unwrap(), settings());
        assert!(path.exists());

        let other = Settings {
            level: "debug".to_string(),
            retries: 9,
        };
        assert_eq!(file.load_or_init(other).unwrap(), settings());
    }

    #[test]
    fn test_save_replaces_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Settings>::new(temp_dir.path().join("config.toml"));

        file.load_or_init(settings()).unwrap();
        let changed = Settings {
            level: "warn".to_string(),
            retries: 5,
        };
        file.save(&changed).unwrap();

        assert_eq!(file.load().unwrap().unwrap(), changed);
        assert!(!temp_dir.path().join(".config.toml.tmp").exists());
        assert!(!temp_dir.path().join("config.lock").exists());
    }

    #[test]
    fn test_parse_error_maps_to_serialization() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "level = [unterminated").unwrap();

        let err: PersonaError = AtomicTomlFile::<Settings>::new(path).load().unwrap_err().into();
        assert!(matches!(err, PersonaError::Serialization { .. }));
    }
}
