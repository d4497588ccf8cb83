//! Public configuration for the Azure Cognitive Search client.
//!
//! The internal endpoint description is derived from this.

use std::time::Duration;

use indexer_core::IndexerSettings;

/// REST API version the client speaks.
pub const DEFAULT_API_VERSION: &str = "2020-06-30";

/// Configuration for the Azure Cognitive Search client.
///
/// # Example
///
/// ```
/// use indexer_azure::AzureSearchConfig;
/// use std::time::Duration;
///
/// let config = AzureSearchConfig::new("my-service", "admin-key", "documents")
///     .with_timeout(Duration::from_secs(10))
///     .with_max_retries(5);
/// ```
#[derive(Debug, Clone)]
pub struct AzureSearchConfig {
    /// Search service name, used to derive the endpoint
    pub(crate) service_name: String,
    /// Admin API key sent in the `api-key` header
    pub(crate) api_key: String,
    /// Name of the document index
    pub(crate) index_name: String,
    /// Endpoint override (e.g. for a local emulator)
    pub(crate) endpoint: Option<String>,
    /// REST API version
    pub(crate) api_version: String,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Request timeout
    pub(crate) timeout: Duration,
    /// Maximum number of retry attempts for transient errors
    pub(crate) max_retries: u8,
    /// Base delay for exponential backoff
    pub(crate) retry_base_delay: Duration,
}

impl AzureSearchConfig {
    /// Create a configuration with default transport settings.
    pub fn new(
        service_name: impl Into<String>,
        api_key: impl Into<String>,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            api_key: api_key.into(),
            index_name: index_name.into(),
            endpoint: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            user_agent: concat!("indexer-azure/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
        }
    }

    /// Build a configuration from indexer settings.
    ///
    /// Returns `None` when the search index is not configured.
    pub fn from_settings(settings: &IndexerSettings) -> Option<Self> {
        if !settings.is_search_index_enabled() {
            return None;
        }
        Some(Self::new(
            settings.service_name()?,
            settings.api_key()?,
            settings.index_name().unwrap_or_default(),
        ))
    }

    /// Endpoint the client talks to.
    ///
    /// Defaults to `https://{service_name}.search.windows.net`.
    pub fn endpoint(&self) -> String {
        self.endpoint.clone().unwrap_or_else(|| {
            format!("https://{}.search.windows.net", self.service_name)
        })
    }

    /// Name of the document index.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Override the service endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the REST API version.
    ///
    /// Defaults to `2020-06-30`.
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retry attempts for transient errors.
    ///
    /// Defaults to 3 retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay for exponential backoff retries.
    ///
    /// Defaults to 500ms.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }
}
