//! Root configuration model (`config.toml`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default `EnvFilter` directive when neither the environment nor the config sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RootConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where persona files are kept.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageConfig {
    /// Overrides the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or `persona_infrastructure=debug`
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: RootConfig = toml::from_str("").unwrap();
        assert_eq!(config, RootConfig::default());
        assert_eq!(config.logging.level, "info");
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_parse_full_document() {
        let config: RootConfig = toml::from_str(
            r#"
[storage]
data_dir = "/var/lib/personas"

[logging]
level = "debug"
"#,
        )
        .unwrap();
        assert_eq!(
            config.storage.data_dir,
            Some(PathBuf::from("/var/lib/personas"))
        );
        assert_eq!(config.logging.level, "debug");
    }
}
