//! Core services - orchestration over the search index port.
//!
//! Services here don't know about concrete adapters; they receive an
//! `Arc<dyn SearchIndexPort>` and work in domain types.

mod index_schema;
mod search_service;

pub use index_schema::{CONTENT_FIELD, KEY_FIELD, document_index_definition};
pub use search_service::{MAX_BATCH_SIZE, SearchService, branch_filter};
