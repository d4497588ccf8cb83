//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the Axum web adapter. All concrete implementations are instantiated here.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use indexer_azure::{AzureSearchConfig, DefaultAzureSearchClient};
use indexer_core::ports::{SearchIndexPort, UnconfiguredSearchIndex};
use indexer_core::{IndexerSettings, SearchService};
use tokio::net::TcpListener;

use crate::auth::Authenticator;
use crate::discovery::{DiscoveryClient, REGISTRATION_INTERVAL, ServiceRegistration, spawn_registration};

/// Port the server listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 5000;

/// Timeout for requests to the OAuth authority and the discovery agent.
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(30);

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port for the HTTP server.
    pub port: u16,
    /// Loaded application settings.
    pub settings: IndexerSettings,
    /// Skip creating or updating the search index at startup.
    pub skip_index_setup: bool,
}

impl ServerConfig {
    /// Create config with default bind address and port.
    pub fn new(settings: IndexerSettings) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            settings,
            skip_index_setup: false,
        }
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub const fn with_skip_index_setup(mut self, skip: bool) -> Self {
        self.skip_index_setup = skip;
        self
    }
}

/// Application context for the Axum adapter.
pub struct AxumContext {
    /// Document search and indexing.
    pub search: Arc<SearchService>,
    /// `/api` request authentication.
    pub auth: Authenticator,
}

impl AxumContext {
    pub fn new(search: SearchService, auth: Authenticator) -> Self {
        Self {
            search: Arc::new(search),
            auth,
        }
    }
}

/// Build the search index port for the configured vendor.
fn build_search_index(settings: &IndexerSettings) -> Result<Arc<dyn SearchIndexPort>> {
    let Some(azure) = AzureSearchConfig::from_settings(settings) else {
        tracing::warn!(
            target: "indexer.bootstrap",
            "Azure Search is not configured: uploads and deletes are skipped, search is unavailable"
        );
        return Ok(Arc::new(UnconfiguredSearchIndex));
    };

    tracing::info!(
        target: "indexer.bootstrap",
        endpoint = %azure.endpoint(),
        index = azure.index_name(),
        "Using Azure Search"
    );
    let client = DefaultAzureSearchClient::new(&azure).context("failed to create Azure Search client")?;
    Ok(Arc::new(client))
}

/// Bootstrap the Axum server with all services.
///
/// Wires the Azure adapter for the configured settings, then continues as
/// [`bootstrap_with_index`].
pub async fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    let index = build_search_index(&config.settings)?;
    bootstrap_with_index(config, index).await
}

/// Bootstrap the Axum server over an already built search index port.
///
/// Creates or updates the search index when an API key is configured,
/// unless `skip_index_setup` is set. A failure there aborts startup.
pub async fn bootstrap_with_index(
    config: &ServerConfig,
    index: Arc<dyn SearchIndexPort>,
) -> Result<AxumContext> {
    let settings = &config.settings;

    let search = SearchService::new(index, settings.clone());

    if config.skip_index_setup {
        tracing::info!(target: "indexer.bootstrap", "Skipping search index setup");
    } else if settings.api_key().is_some() {
        search
            .create_or_update_index()
            .await
            .context("failed to create or update the search index")?;
    }

    let http = reqwest::Client::builder()
        .timeout(OUTBOUND_TIMEOUT)
        .build()
        .context("failed to create HTTP client")?;
    let auth = Authenticator::from_settings(settings, http);
    if !auth.is_enabled() {
        tracing::warn!(
            target: "indexer.bootstrap",
            "No SecurityToken or OAuthAuthority configured: /api is not authenticated"
        );
    }

    Ok(AxumContext::new(search, auth))
}

/// Start the web server.
///
/// Also starts the service discovery job when a discovery agent is configured.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tracing::info;

    let ctx = bootstrap(&config).await?;
    let app = crate::routes::create_router(ctx);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local: SocketAddr = listener.local_addr()?;

    let discovery = match config.settings.service_discovery.as_ref() {
        Some(sd) => match sd.server_address() {
            Some(server) => {
                let http = reqwest::Client::builder().timeout(OUTBOUND_TIMEOUT).build()?;
                let registration = ServiceRegistration::from_settings(sd, local.port());
                info!(
                    target: "indexer.discovery",
                    server,
                    id = %registration.id,
                    "Registering with service discovery"
                );
                Some(spawn_registration(
                    DiscoveryClient::new(http, server),
                    registration,
                    REGISTRATION_INTERVAL,
                ))
            }
            None => None,
        },
        None => None,
    };

    info!("Search indexer listening on http://{}", local);
    let served = axum::serve(listener, app).await;

    if let Some(job) = discovery {
        job.abort();
    }
    served?;
    Ok(())
}
