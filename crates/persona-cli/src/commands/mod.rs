pub mod config;
pub mod instance;
pub mod template;

pub use config::ConfigAction;
pub use instance::InstanceAction;
pub use template::TemplateAction;

use anyhow::{Context, Result, bail};
use persona_core::persona::{PersonaConfig, PersonaRepository};
use persona_infrastructure::{AsyncDirPersonaRepository, InMemoryPersonaRepository};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the repository lives for this invocation.
#[derive(Debug, Clone, Default)]
pub struct StorageOptions {
    /// Explicit data directory; the platform default when `None`.
    pub data_dir: Option<PathBuf>,
    /// Use an in-memory repository instead of the filesystem.
    pub ephemeral: bool,
}

/// Opens the repository selected by `options`.
pub async fn open_repository(options: &StorageOptions) -> Result<Arc<dyn PersonaRepository>> {
    if options.ephemeral {
        tracing::debug!("Using in-memory persona repository");
        return Ok(Arc::new(InMemoryPersonaRepository::new()));
    }

    let repository = AsyncDirPersonaRepository::new(options.data_dir.as_deref())
        .await
        .context("Failed to open persona storage")?;
    tracing::debug!(base_dir = %repository.base_dir().display(), "Using persona storage");
    Ok(Arc::new(repository))
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{}", json);
    Ok(())
}

/// Parses a `--config` argument. The value must be a JSON object.
pub fn parse_config_json(raw: &str) -> Result<PersonaConfig> {
    let value: serde_json::Value =
        serde_json::from_str(raw).context("--config is not valid JSON")?;
    match value {
        serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
        other => bail!("--config must be a JSON object, got {}", other),
    }
}
