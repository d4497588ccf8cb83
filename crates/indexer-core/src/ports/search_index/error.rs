//! Error types for search index port operations.

use thiserror::Error;

/// Errors from search index port operations.
///
/// These are domain-level errors that consumers can handle.
/// Implementation-specific errors (HTTP, JSON) are mapped to these.
#[derive(Debug, Error)]
pub enum SearchPortError {
    /// The configured index does not exist on the search service.
    #[error("Index not found: {index}")]
    IndexNotFound {
        /// Name of the missing index
        index: String,
    },

    /// The search service rejected the credentials.
    #[error("Search service rejected the API key")]
    Unauthorized,

    /// The search service is throttling requests.
    #[error("Search service rate limit exceeded, try again later")]
    RateLimited,

    /// The search service rejected the request (bad query, bad filter, ...).
    #[error("Invalid search request: {message}")]
    InvalidRequest {
        /// Message returned by the search service
        message: String,
    },

    /// Network or connectivity error, or a server-side failure.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error
        message: String,
    },

    /// The search service returned a body we could not interpret.
    #[error("Invalid search service response: {message}")]
    InvalidResponse {
        /// What was invalid
        message: String,
    },

    /// Adapter configuration error.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What's wrong with the configuration
        message: String,
    },
}

/// Result type alias for search index port operations.
pub type SearchPortResult<T> = Result<T, SearchPortError>;
