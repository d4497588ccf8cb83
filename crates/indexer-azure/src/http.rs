//! HTTP backend abstraction for the Azure Cognitive Search REST API.
//!
//! The production implementation uses reqwest and retries transient
//! failures with exponential backoff. Tests swap in [`testing::FakeBackend`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::AzureSearchConfig;
use crate::error::{AzureResult, AzureSearchError};
use crate::models::ErrorEnvelope;

/// Header carrying the admin key.
pub const API_KEY_HEADER: &str = "api-key";

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Trait for HTTP backends that exchange JSON with the search service.
///
/// This is an implementation detail - external code should use the
/// `SearchIndexPort` trait.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// `PUT` a JSON body, discarding the response body.
    async fn put_json(&self, url: &Url, body: &serde_json::Value) -> AzureResult<()>;

    /// `POST` a JSON body and deserialize the response.
    async fn post_json<T: DeserializeOwned + Send>(
        &self,
        url: &Url,
        body: &serde_json::Value,
    ) -> AzureResult<T>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest with retry logic.
///
/// Server errors (5xx), throttling (429) and network errors are retried.
pub struct ReqwestBackend {
    client: reqwest::Client,
    api_key: String,
    max_retries: u8,
    retry_base_delay_ms: u64,
}

impl ReqwestBackend {
    /// Create a new reqwest backend with the given configuration.
    pub fn new(config: &AzureSearchConfig) -> AzureResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            max_retries: config.max_retries,
            retry_base_delay_ms: u64::try_from(config.retry_base_delay.as_millis())
                .unwrap_or(u64::MAX),
        })
    }

    fn build_request(
        &self,
        method: Method,
        url: &Url,
        body: &serde_json::Value,
    ) -> reqwest::RequestBuilder {
        self.client
            .request(method, url.as_str())
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
    }

    /// Send a request with automatic retry for transient errors.
    async fn send_with_retry(
        &self,
        method: Method,
        url: &Url,
        body: &serde_json::Value,
    ) -> AzureResult<reqwest::Response> {
        let mut attempt: u8 = 0;

        loop {
            if attempt > 0 {
                let delay = Duration::from_millis(
                    self.retry_base_delay_ms
                        .saturating_mul(2u64.saturating_pow(u32::from(attempt) - 1)),
                );
                tokio::time::sleep(delay).await;
            }
            let can_retry = attempt < self.max_retries;
            attempt += 1;

            match self.build_request(method.clone(), url, body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    if is_transient(status) && can_retry {
                        tracing::warn!(
                            target: "indexer.azure",
                            status = status.as_u16(),
                            attempt,
                            "Transient Azure Search error, retrying"
                        );
                        continue;
                    }

                    let text = response.text().await.unwrap_or_default();
                    return Err(AzureSearchError::ApiRequestFailed {
                        status: status.as_u16(),
                        url: url.to_string(),
                        message: ErrorEnvelope::message_from(&text),
                    });
                }
                Err(e) => {
                    if can_retry {
                        tracing::warn!(
                            target: "indexer.azure",
                            error = %e,
                            attempt,
                            "Azure Search request failed, retrying"
                        );
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn put_json(&self, url: &Url, body: &serde_json::Value) -> AzureResult<()> {
        self.send_with_retry(Method::PUT, url, body).await?;
        Ok(())
    }

    async fn post_json<T: DeserializeOwned + Send>(
        &self,
        url: &Url,
        body: &serde_json::Value,
    ) -> AzureResult<T> {
        let response = self.send_with_retry(Method::POST, url, body).await?;
        let data: T = response.json().await?;
        Ok(data)
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================
