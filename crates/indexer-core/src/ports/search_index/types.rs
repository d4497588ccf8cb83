//! DTOs for the search index port.
//!
//! These mirror the concepts of a managed search service (index schema,
//! search parameters, batch actions) without tying the core to its wire
//! format.

use std::collections::HashMap;

use crate::domain::{DocumentIndexDto, DocumentModel};

/// Data type of an index field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// A single string value.
    String,
    /// A collection of strings.
    StringCollection,
}

/// A single field in an index schema.
///
/// Attribute flags default to `false`; use the builder methods to turn them on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexField {
    pub name: String,
    pub field_type: FieldType,
    pub key: bool,
    pub retrievable: bool,
    pub filterable: bool,
    pub facetable: bool,
    pub searchable: bool,
    pub sortable: bool,
}

impl IndexField {
    /// Create a field with all attribute flags off.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            key: false,
            retrievable: false,
            filterable: false,
            facetable: false,
            searchable: false,
            sortable: false,
        }
    }

    #[must_use]
    pub const fn key(mut self) -> Self {
        self.key = true;
        self
    }

    #[must_use]
    pub const fn retrievable(mut self) -> Self {
        self.retrievable = true;
        self
    }

    #[must_use]
    pub const fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    #[must_use]
    pub const fn facetable(mut self) -> Self {
        self.facetable = true;
        self
    }

    #[must_use]
    pub const fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    #[must_use]
    pub const fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

/// Index schema pushed on startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    pub name: String,
    pub fields: Vec<IndexField>,
}

impl IndexDefinition {
    /// Name of the key field, if the schema declares one.
    pub fn key_field(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key)
            .map(|f| f.name.as_str())
    }
}

/// Query syntax used to interpret the search text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryType {
    #[default]
    Simple,
    /// Full Lucene query syntax.
    Full,
}

/// Whether any or all search terms must match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    #[default]
    Any,
    All,
}

/// Parameters of a single search call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub search_text: String,
    /// OData filter expression.
    pub filter: Option<String>,
    pub skip: Option<u64>,
    pub top: Option<u64>,
    pub highlight_fields: Vec<String>,
    /// Fields to return. Empty means every retrievable field.
    pub select: Vec<String>,
    /// Sort clauses such as `id asc`. Empty means by relevance.
    pub order_by: Vec<String>,
    pub query_type: QueryType,
    pub search_mode: SearchMode,
    pub include_total_count: bool,
}

/// A single scored document returned by the search service.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub score: f64,
    pub highlights: HashMap<String, Vec<String>>,
    pub document: DocumentIndexDto,
}

/// Result page of a search call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    /// Total number of matches, when requested.
    pub count: Option<u64>,
    pub results: Vec<SearchHit>,
}

/// A single action in an index batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexAction {
    /// Merge the document into an existing one, or upload it if absent.
    MergeOrUpload(DocumentModel),
    /// Delete the document with the given key.
    Delete { key: String },
}

impl IndexAction {
    /// Key of the document this action targets.
    pub fn key(&self) -> &str {
        match self {
            Self::MergeOrUpload(doc) => &doc.id,
            Self::Delete { key } => key,
        }
    }
}

/// A batch of index actions submitted in one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexBatch {
    pub actions: Vec<IndexAction>,
}

impl IndexBatch {
    pub fn merge_or_upload(documents: impl IntoIterator<Item = DocumentModel>) -> Self {
        Self {
            actions: documents.into_iter().map(IndexAction::MergeOrUpload).collect(),
        }
    }

    pub fn delete(keys: impl IntoIterator<Item = String>) -> Self {
        Self {
            actions: keys
                .into_iter()
                .map(|key| IndexAction::Delete { key })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Per-document outcome of an index batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexingResult {
    pub key: String,
    pub succeeded: bool,
    pub status_code: u16,
    pub error_message: Option<String>,
}
