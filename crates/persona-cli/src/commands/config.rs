use super::{StorageOptions, print_json};
use anyhow::{Context, Result};
use clap::Subcommand;
use persona_core::config::RootConfig;
use persona_infrastructure::{ConfigService, PersonaPaths};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration (file plus environment overrides)
    Show,
    /// Print the config file and data directory locations
    Path,
}

#[derive(Serialize)]
struct Locations {
    config_file: PathBuf,
    /// `None` in ephemeral mode
    data_dir: Option<PathBuf>,
}

pub fn run(
    action: ConfigAction,
    service: &ConfigService,
    config: &RootConfig,
    storage: &StorageOptions,
) -> Result<()> {
    match action {
        ConfigAction::Show => print_json(config),
        ConfigAction::Path => print_json(&locations(service, storage)?),
    }
}

fn locations(service: &ConfigService, storage: &StorageOptions) -> Result<Locations> {
    let config_file = service
        .config_path()
        .context("Failed to resolve config file path")?;
    let data_dir = if storage.ephemeral {
        None
    } else {
        let paths = PersonaPaths::new(storage.data_dir.as_deref());
        Some(
            paths
                .data_dir()
                .context("Failed to resolve data directory")?,
        )
    };
    Ok(Locations {
        config_file,
        data_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locations_use_explicit_paths() {
        let service = ConfigService::with_path(Some(PathBuf::from("/tmp/hub/config.toml")));
        let storage = StorageOptions {
            data_dir: Some(PathBuf::from("/tmp/hub/data")),
            ephemeral: false,
        };

        let locations = locations(&service, &storage).unwrap();
        assert_eq!(locations.config_file, PathBuf::from("/tmp/hub/config.toml"));
        assert_eq!(locations.data_dir, Some(PathBuf::from("/tmp/hub/data")));
    }

    #[test]
    fn test_ephemeral_has_no_data_dir() {
        let service = ConfigService::with_path(Some(PathBuf::from("/tmp/hub/config.toml")));
        let storage = StorageOptions {
            data_dir: None,
            ephemeral: true,
        };
        assert!(locations(&service, &storage).unwrap().data_dir.is_none());
    }
}
