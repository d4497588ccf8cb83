//! Command-line arguments and settings loading.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indexer_axum::{DEFAULT_PORT, ServerConfig};
use indexer_core::{DEFAULT_ENVIRONMENT, IndexerSettings, validate_settings};

/// Thin proxy in front of an Azure Cognitive Search index.
#[derive(Debug, Parser)]
#[command(name = "indexer-azuresearch")]
#[command(about = "Index and search project documentation through Azure Cognitive Search")]
#[command(version)]
pub struct Cli {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory holding appsettings.json
    #[arg(long = "settings-dir", env = "INDEXER_SETTINGS_DIR", default_value = ".")]
    pub settings_dir: PathBuf,

    /// Environment name selecting appsettings.{environment}.json
    #[arg(long, env = "INDEXER_ENVIRONMENT", default_value = DEFAULT_ENVIRONMENT)]
    pub environment: String,

    /// Do not create or update the search index at startup
    #[arg(long)]
    pub skip_index_setup: bool,
}

impl Cli {
    /// Server configuration for these arguments and the loaded settings.
    pub fn server_config(&self, settings: IndexerSettings) -> ServerConfig {
        ServerConfig::new(settings)
            .with_host(self.host.clone())
            .with_port(self.port)
            .with_skip_index_setup(self.skip_index_setup)
    }
}

/// Load and validate settings for the given arguments.
pub fn load_settings(cli: &Cli) -> Result<IndexerSettings> {
    let settings = IndexerSettings::load(&cli.settings_dir, &cli.environment).with_context(|| {
        format!(
            "failed to load settings from {}",
            cli.settings_dir.display()
        )
    })?;
    validate_settings(&settings).context("invalid settings")?;
    Ok(settings)
}
