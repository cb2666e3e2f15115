//! Logging setup for the CLI.
//!
//! Logs go to stderr so that stdout only carries command output.

use anyhow::{Result, anyhow};
use persona_core::config::DEFAULT_LOG_LEVEL;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `directive` is an `EnvFilter` directive (`PERSONA_HUB_LOG` has already been
/// folded into it by the config service). An unparsable directive falls back
/// to the default level.
pub fn init_logging(directive: &str) -> Result<()> {
    let (filter, rejected) = match EnvFilter::try_new(directive) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(DEFAULT_LOG_LEVEL), Some(e)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    if let Some(e) = rejected {
        tracing::warn!(directive = %directive, error = %e, "Invalid log directive, using default");
    }

    Ok(())
}
