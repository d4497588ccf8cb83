//! Azure Cognitive Search client.
//!
//! Speaks the REST API in terms of the wire types in `models`; the
//! `SearchIndexPort` implementation in `port.rs` converts to and from the
//! core DTOs.

mod documents;
mod index;

use url::Url;

use crate::config::AzureSearchConfig;
use crate::error::AzureResult;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::models::SearchEndpoint;

// ============================================================================
// Type Aliases
// ============================================================================

/// Default Azure Cognitive Search client using the reqwest HTTP backend.
pub type DefaultAzureSearchClient = AzureSearchClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for one index of an Azure Cognitive Search service.
///
/// Generic over the HTTP backend so tests can run without a network. Use
/// `DefaultAzureSearchClient` in production code.
pub struct AzureSearchClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) endpoint: SearchEndpoint,
}

impl DefaultAzureSearchClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &AzureSearchConfig) -> AzureResult<Self> {
        let endpoint = Self::to_endpoint(config)?;
        let backend = ReqwestBackend::new(config)?;
        Ok(Self { backend, endpoint })
    }

    fn to_endpoint(config: &AzureSearchConfig) -> AzureResult<SearchEndpoint> {
        Ok(SearchEndpoint {
            base_url: Url::parse(&config.endpoint())?,
            index_name: config.index_name.clone(),
            api_version: config.api_version.clone(),
        })
    }
}

impl<B: HttpBackend> AzureSearchClient<B> {
    /// Create a new client with a custom backend.
    #[cfg(test)]
    pub(crate) const fn with_backend(endpoint: SearchEndpoint, backend: B) -> Self {
        Self { backend, endpoint }
    }

    /// Name of the index this client targets.
    pub fn index_name(&self) -> &str {
        &self.endpoint.index_name
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::AzureSearchError;

    pub fn test_endpoint() -> SearchEndpoint {
        SearchEndpoint {
            base_url: Url::parse("https://svc.search.windows.net").unwrap(),
            index_name: "documents".to_string(),
            api_version: "2020-06-30".to_string(),
        }
    }

    #[test]
    fn test_default_client_creation() {
        let config = AzureSearchConfig::new("svc", "key", "documents");
        let client = DefaultAzureSearchClient::new(&config).unwrap();
        assert_eq!(client.index_name(), "documents");
        assert_eq!(
            client.endpoint.base_url.as_str(),
            "https://svc.search.windows.net/"
        );
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let config = AzureSearchConfig::new("svc", "key", "documents").with_endpoint("not a url");
        let result = DefaultAzureSearchClient::new(&config);
        assert!(matches!(result, Err(AzureSearchError::InvalidUrl(_))));
    }
}
