//! Internal REST wire types for Azure Cognitive Search.
//!
//! These types are internal to `indexer-azure`. Consumers use the port DTOs
//! defined in `indexer-core`.

use std::collections::HashMap;

use indexer_core::DocumentModel;
use serde::{Deserialize, Serialize};
use url::Url;

// ============================================================================
// Endpoint (used internally, see config.rs for public config)
// ============================================================================

/// Resolved endpoint and transport settings.
#[derive(Debug, Clone)]
pub struct SearchEndpoint {
    /// Service root, e.g. `https://svc.search.windows.net`
    pub base_url: Url,
    pub index_name: String,
    pub api_version: String,
}

// ============================================================================
// Index definition
// ============================================================================

/// Body of `PUT /indexes/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexBody {
    pub name: String,
    pub fields: Vec<FieldBody>,
}

/// A field in an index definition.
///
/// Every attribute is sent explicitly; the REST defaults differ per field type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldBody {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: &'static str,
    pub key: bool,
    pub retrievable: bool,
    pub filterable: bool,
    pub facetable: bool,
    pub searchable: bool,
    pub sortable: bool,
}

// ============================================================================
// Search
// ============================================================================

/// Body of `POST /indexes/{name}/docs/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBody {
    pub search: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<u64>,
    /// Comma separated field list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
    /// Comma separated field list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,
    /// Comma separated sort clauses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orderby: Option<String>,
    pub query_type: &'static str,
    pub search_mode: &'static str,
    pub count: bool,
}

/// Response of a search call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponseBody {
    #[serde(rename = "@odata.count", default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub value: Vec<SearchHitBody>,
}

/// A single hit. Document fields sit next to the `@search.*` annotations.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHitBody {
    #[serde(rename = "@search.score", default)]
    pub score: f64,
    #[serde(rename = "@search.highlights", default)]
    pub highlights: Option<HashMap<String, Vec<String>>>,
    #[serde(flatten)]
    pub document: DocumentBody,
}

/// Document fields as returned by the service. Any field may be `null`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentBody {
    pub id: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    pub branch_name: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

// ============================================================================
// Indexing
// ============================================================================

/// Body of `POST /indexes/{name}/docs/index`.
#[derive(Debug, Clone, Serialize)]
pub struct IndexBatchBody<'a> {
    pub value: Vec<IndexActionBody<'a>>,
}

/// A single batch action, tagged with `@search.action`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "@search.action", rename_all = "camelCase")]
pub enum IndexActionBody<'a> {
    MergeOrUpload(&'a DocumentModel),
    Delete { id: &'a str },
}

/// Response of an indexing call (HTTP 200 or 207).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexBatchResponseBody {
    #[serde(default)]
    pub value: Vec<IndexingResultBody>,
}

/// Per-document outcome of an indexing call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingResultBody {
    pub key: String,
    pub status: bool,
    #[serde(default)]
    pub error_message: Option<String>,
    pub status_code: u16,
}

// ============================================================================
// Errors
// ============================================================================

/// Error envelope returned with 4xx/5xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

impl ErrorEnvelope {
    /// Extract a readable message from an error response body.
    pub fn message_from(body: &str) -> Option<String> {
        if body.trim().is_empty() {
            return None;
        }
        match serde_json::from_str::<Self>(body) {
            Ok(envelope) => Some(envelope.error.code.map_or_else(
                || envelope.error.message.clone(),
                |code| format!("{code}: {}", envelope.error.message),
            )),
            Err(_) => Some(body.trim().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_body_skips_unset_fields() {
        let body = SearchBody {
            search: "*".to_string(),
            query_type: "simple",
            search_mode: "any",
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"search": "*", "queryType": "simple", "searchMode": "any", "count": false})
        );
    }

    #[test]
    fn test_hit_reads_annotations_and_nulls() {
        let hit: SearchHitBody = serde_json::from_value(json!({
            "@search.score": 2.5,
            "@search.highlights": {"content": ["<em>rust</em>"]},
            "id": "a",
            "url": "master/a.md",
            "title": null,
            "projectId": "p1",
            "tags": null
        }))
        .unwrap();

        assert!((hit.score - 2.5).abs() < f64::EPSILON);
        assert_eq!(hit.highlights.unwrap()["content"], vec!["<em>rust</em>"]);
        assert_eq!(hit.document.id.as_deref(), Some("a"));
        assert_eq!(hit.document.title, None);
        assert_eq!(hit.document.tags, None);
    }

    #[test]
    fn test_batch_actions_are_tagged() {
        let doc = DocumentModel {
            id: "a".to_string(),
            branch_name: "master".to_string(),
            ..Default::default()
        };
        let body = IndexBatchBody {
            value: vec![
                IndexActionBody::MergeOrUpload(&doc),
                IndexActionBody::Delete { id: "b" },
            ],
        };
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["value"][0]["@search.action"], "mergeOrUpload");
        assert_eq!(value["value"][0]["id"], "a");
        assert_eq!(value["value"][0]["branchName"], "master");
        assert_eq!(value["value"][1], json!({"@search.action": "delete", "id": "b"}));
    }

    #[test]
    fn test_indexing_result_parse() {
        let body: IndexBatchResponseBody = serde_json::from_value(json!({
            "value": [
                {"key": "a", "status": true, "errorMessage": null, "statusCode": 201},
                {"key": "b", "status": false, "errorMessage": "Document is too large", "statusCode": 400}
            ]
        }))
        .unwrap();

        assert_eq!(body.value.len(), 2);
        assert!(body.value[0].status);
        assert_eq!(body.value[1].status_code, 400);
        assert_eq!(
            body.value[1].error_message.as_deref(),
            Some("Document is too large")
        );
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"error":{"code":"InvalidRequestParameter","message":"Invalid expression"}}"#;
        assert_eq!(
            ErrorEnvelope::message_from(body).as_deref(),
            Some("InvalidRequestParameter: Invalid expression")
        );
        assert_eq!(
            ErrorEnvelope::message_from("Bad gateway").as_deref(),
            Some("Bad gateway")
        );
        assert_eq!(ErrorEnvelope::message_from("  "), None);
    }
}
