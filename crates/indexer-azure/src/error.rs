//! Error types for Azure Cognitive Search operations.
//!
//! These are mapped to core port errors at the `SearchIndexPort` boundary.

use thiserror::Error;

/// Result type alias for Azure Cognitive Search operations.
pub type AzureResult<T> = Result<T, AzureSearchError>;

/// Errors raised while talking to Azure Cognitive Search.
#[derive(Debug, Error)]
pub enum AzureSearchError {
    /// The service answered with an HTTP error status.
    #[error("Azure Search request failed with status {status}: {url}{}", detail(.message.as_deref()))]
    ApiRequestFailed {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
        /// Error message from the response body, if any
        message: Option<String>,
    },

    /// The service answered with a body we could not use.
    #[error("Invalid response from Azure Search: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// The client configuration cannot produce valid requests.
    #[error("Invalid Azure Search configuration: {message}")]
    Configuration {
        /// What is wrong with the configuration
        message: String,
    },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

fn detail(message: Option<&str>) -> String {
    message.map(|m| format!(" ({m})")).unwrap_or_default()
}
