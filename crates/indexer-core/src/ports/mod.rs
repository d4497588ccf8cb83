//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.

pub mod search_index;

use thiserror::Error;

pub use search_index::{
    FieldType, IndexAction, IndexBatch, IndexDefinition, IndexField, IndexingResult, QueryType,
    SearchHit, SearchIndexPort, SearchMode, SearchPortError, SearchPortResult, SearchRequest,
    SearchResponse, UnconfiguredSearchIndex,
};

/// Core error type for semantic domain errors.
///
/// This is the canonical error type used across the core domain.
/// Adapters should map this to their own error types (HTTP status codes,
/// CLI exit codes).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Search service operation failed.
    #[error(transparent)]
    SearchIndex(#[from] SearchPortError),

    /// Validation error (invalid input).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The service is missing configuration needed for this operation.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
