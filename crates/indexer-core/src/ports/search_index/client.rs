//! Search index port trait.

use async_trait::async_trait;

use super::error::{SearchPortError, SearchPortResult};
use super::types::{IndexBatch, IndexDefinition, IndexingResult, SearchRequest, SearchResponse};

/// Port trait for managed search service operations.
///
/// This trait defines the interface that the core domain uses to interact
/// with the search service. The implementation lives in `indexer-azure`.
///
/// # Design
///
/// - Uses core-owned DTOs, not vendor wire types
/// - Returns `SearchPortError` for all failures
/// - Per-document batch failures are reported in the returned results,
///   not as an error
#[async_trait]
pub trait SearchIndexPort: Send + Sync {
    /// Create the index, or update its schema if it already exists.
    async fn create_or_update_index(&self, definition: &IndexDefinition) -> SearchPortResult<()>;

    /// Run a search against the configured index.
    async fn search(&self, request: &SearchRequest) -> SearchPortResult<SearchResponse>;

    /// Submit a batch of upload/delete actions.
    async fn index_batch(&self, batch: &IndexBatch) -> SearchPortResult<Vec<IndexingResult>>;
}

/// Search index used when no search service is configured.
///
/// Every call fails with `SearchPortError::Configuration`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredSearchIndex;

impl UnconfiguredSearchIndex {
    fn error() -> SearchPortError {
        SearchPortError::Configuration {
            message: "no search service is configured".to_string(),
        }
    }
}

#[async_trait]
impl SearchIndexPort for UnconfiguredSearchIndex {
    async fn create_or_update_index(&self, _definition: &IndexDefinition) -> SearchPortResult<()> {
        Err(Self::error())
    }

    async fn search(&self, _request: &SearchRequest) -> SearchPortResult<SearchResponse> {
        Err(Self::error())
    }

    async fn index_batch(&self, _batch: &IndexBatch) -> SearchPortResult<Vec<IndexingResult>> {
        Err(Self::error())
    }
}
