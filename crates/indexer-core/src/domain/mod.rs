//! Domain types for indexed documents and search requests.
//!
//! These are the data-transfer shapes exposed over HTTP. They contain no
//! vendor-specific details; adapters translate them at the port boundary.

mod document;
mod search;

pub use document::{DocumentIndexDto, DocumentModel, file_uri_for};
pub use search::{DocumentSearchResultDto, FilterDto, MATCH_ALL_QUERY, SearchResultDto};
