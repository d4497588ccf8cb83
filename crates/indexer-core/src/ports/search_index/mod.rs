//! Search index port definitions.
//!
//! This module defines the port trait and DTOs for the managed search service.
//! The actual implementation lives in `indexer-azure`.

mod client;
mod error;
mod types;

pub use client::{SearchIndexPort, UnconfiguredSearchIndex};
pub use error::{SearchPortError, SearchPortResult};
pub use types::{
    FieldType, IndexAction, IndexBatch, IndexDefinition, IndexField, IndexingResult, QueryType,
    SearchHit, SearchMode, SearchRequest, SearchResponse,
};
