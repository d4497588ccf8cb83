//! URL construction helpers for the Azure Cognitive Search REST API.

use url::Url;

use crate::error::{AzureResult, AzureSearchError};
use crate::models::SearchEndpoint;

/// `PUT` target for creating or updating an index definition.
pub fn build_index_url(endpoint: &SearchEndpoint, index_name: &str) -> AzureResult<Url> {
    build_url(endpoint, &["indexes", index_name])
}

/// `POST` target for searching the configured index.
pub fn build_search_url(endpoint: &SearchEndpoint) -> AzureResult<Url> {
    build_url(endpoint, &["indexes", &endpoint.index_name, "docs", "search"])
}

/// `POST` target for submitting an index batch to the configured index.
pub fn build_batch_url(endpoint: &SearchEndpoint) -> AzureResult<Url> {
    build_url(endpoint, &["indexes", &endpoint.index_name, "docs", "index"])
}

fn build_url(endpoint: &SearchEndpoint, segments: &[&str]) -> AzureResult<Url> {
    let mut url = endpoint.base_url.clone();
    url.path_segments_mut()
        .map_err(|()| AzureSearchError::Configuration {
            message: format!("endpoint '{}' cannot be a base URL", endpoint.base_url),
        })?
        .pop_if_empty()
        .extend(segments);
    url.query_pairs_mut()
        .clear()
        .append_pair("api-version", &endpoint.api_version);
    Ok(url)
}
