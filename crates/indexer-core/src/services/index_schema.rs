//! Schema of the document index.

use crate::ports::{FieldType, IndexDefinition, IndexField};

/// Key field of the document index.
pub const KEY_FIELD: &str = "id";

/// Field carrying the searchable document body.
pub const CONTENT_FIELD: &str = "content";

/// Build the document index schema for the given index name.
///
/// `content` is searchable but never returned; clients get highlights instead.
pub fn document_index_definition(index_name: &str) -> IndexDefinition {
    IndexDefinition {
        name: index_name.to_string(),
        fields: vec![
            IndexField::new(KEY_FIELD, FieldType::String)
                .key()
                .retrievable()
                .sortable(),
            IndexField::new("url", FieldType::String).retrievable(),
            IndexField::new("title", FieldType::String).retrievable(),
            IndexField::new("projectId", FieldType::String)
                .retrievable()
                .filterable(),
            IndexField::new("projectName", FieldType::String)
                .retrievable()
                .filterable(),
            IndexField::new("branchName", FieldType::String)
                .retrievable()
                .filterable(),
            IndexField::new("tags", FieldType::StringCollection)
                .retrievable()
                .filterable()
                .facetable(),
            IndexField::new(CONTENT_FIELD, FieldType::String).searchable(),
        ],
    }
}
