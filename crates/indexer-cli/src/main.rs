//! CLI entry point - the composition root.
//!
//! Loads `.env`, initialises logging, reads settings and runs the server.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use indexer_axum::start_server;
use indexer_cli::{Cli, load_settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before anything reads them
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    tracing::info!(
        environment = %cli.environment,
        settings_dir = %cli.settings_dir.display(),
        search_enabled = settings.is_search_index_enabled(),
        auth_enabled = settings.is_auth_enabled(),
        "Starting search indexer"
    );

    start_server(cli.server_config(settings)).await
}
