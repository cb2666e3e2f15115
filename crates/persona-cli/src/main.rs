use anyhow::Result;
use clap::{Parser, Subcommand};
use persona_infrastructure::ConfigService;
use std::path::PathBuf;

mod commands;
mod logging;

use commands::{ConfigAction, InstanceAction, StorageOptions, TemplateAction};

#[derive(Parser)]
#[command(name = "persona-hub")]
#[command(about = "Persona Hub CLI - manage persona templates and per-user instances", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory holding templates/ and instances/ (overrides config and environment)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Keep everything in memory for this invocation
    #[arg(long, global = true, conflicts_with = "data_dir")]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage persona templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
    /// Manage persona instances owned by users
    Instance {
        #[command(subcommand)]
        action: InstanceAction,
    },
    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_service = ConfigService::with_path(cli.config);
    let config = config_service.get_config();
    logging::init_logging(&config.logging.level)?;

    let storage = StorageOptions {
        data_dir: cli.data_dir.or_else(|| config.storage.data_dir.clone()),
        ephemeral: cli.ephemeral,
    };

    match cli.command {
        Commands::Template { action } => {
            let repository = commands::open_repository(&storage).await?;
            commands::template::run(action, repository.as_ref()).await?;
        }
        Commands::Instance { action } => {
            let repository = commands::open_repository(&storage).await?;
            commands::instance::run(action, repository.as_ref()).await?;
        }
        Commands::Config { action } => {
            commands::config::run(action, &config_service, &config, &storage)?;
        }
    }

    Ok(())
}
