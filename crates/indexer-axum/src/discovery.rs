//! Service discovery registration.
//!
//! When `ServiceDiscovery.ServerAddress` is configured the server registers
//! itself with a Consul-compatible agent and repeats the registration every
//! [`REGISTRATION_INTERVAL`], so the entry comes back after an agent restart.

use std::time::Duration;

use indexer_core::ServiceDiscoverySettings;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;

/// How often the registration is refreshed.
pub const REGISTRATION_INTERVAL: Duration = Duration::from_secs(60);

/// Service name used when none is configured.
pub const DEFAULT_SERVICE_NAME: &str = "indexer-azuresearch";

const REGISTER_PATH: &str = "v1/agent/service/register";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("discovery agent request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("discovery agent answered with status {status}")]
    Status { status: u16 },
}

/// Agent health check pointing at `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthCheck {
    #[serde(rename = "HTTP")]
    pub http: String,
    pub interval: String,
    pub deregister_critical_service_after: String,
}

/// Body of an agent service registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRegistration {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub address: String,
    pub port: u16,
    pub tags: Vec<String>,
    pub check: HealthCheck,
}

impl ServiceRegistration {
    /// Build the registration, filling gaps with the listening port and
    /// local defaults.
    pub fn from_settings(settings: &ServiceDiscoverySettings, listen_port: u16) -> Self {
        let pick = |value: Option<&String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let name = pick(settings.service_name.as_ref())
            .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string());
        let id = pick(settings.service_id.as_ref()).unwrap_or_else(|| name.clone());
        let address =
            pick(settings.service_address.as_ref()).unwrap_or_else(|| "localhost".to_string());
        let port = settings.service_port.unwrap_or(listen_port);

        Self {
            check: HealthCheck {
                http: format!("http://{address}:{port}/health"),
                interval: "10s".to_string(),
                deregister_critical_service_after: "1m".to_string(),
            },
            id,
            name,
            address,
            port,
            tags: settings.service_tags.clone(),
        }
    }
}

/// Client for the discovery agent's HTTP API.
#[derive(Clone)]
pub struct DiscoveryClient {
    client: reqwest::Client,
    server_address: String,
}

impl DiscoveryClient {
    pub fn new(client: reqwest::Client, server_address: &str) -> Self {
        Self {
            client,
            server_address: server_address.trim_end_matches('/').to_string(),
        }
    }

    /// Register (or re-register) the service.
    pub async fn register(&self, registration: &ServiceRegistration) -> Result<(), DiscoveryError> {
        let url = format!("{}/{REGISTER_PATH}", self.server_address);
        let response = self.client.put(&url).json(registration).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

/// Spawn the periodic registration job.
///
/// The first registration happens immediately. Failures are logged and
/// retried on the next tick.
pub fn spawn_registration(
    client: DiscoveryClient,
    registration: ServiceRegistration,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match client.register(&registration).await {
                Ok(()) => tracing::debug!(
                    target: "indexer.discovery",
                    id = %registration.id,
                    "Service registered"
                ),
                Err(e) => tracing::warn!(
                    target: "indexer.discovery",
                    id = %registration.id,
                    error = %e,
                    "Service registration failed"
                ),
            }
        }
    })
}
