#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;
pub mod services;
pub mod settings;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use domain::{
    DocumentIndexDto, DocumentModel, DocumentSearchResultDto, FilterDto, MATCH_ALL_QUERY,
    SearchResultDto, file_uri_for,
};
pub use ports::{
    CoreError, CoreResult, FieldType, IndexAction, IndexBatch, IndexDefinition, IndexField,
    IndexingResult, QueryType, SearchHit, SearchIndexPort, SearchMode, SearchPortError,
    SearchPortResult, SearchRequest, SearchResponse, UnconfiguredSearchIndex,
};
pub use services::{SearchService, branch_filter, document_index_definition};
pub use settings::{
    DEFAULT_ENVIRONMENT, IndexerSettings, SETTINGS_FILE, ServiceDiscoverySettings, SettingKey,
    SettingsError, validate_settings,
};
