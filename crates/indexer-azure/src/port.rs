//! Port trait implementation for `AzureSearchClient`.
//!
//! Converts between the core search index DTOs and the REST wire types,
//! and maps `AzureSearchError` onto `SearchPortError`.

use async_trait::async_trait;
use indexer_core::ports::{
    FieldType, IndexAction, IndexBatch, IndexDefinition, IndexField, IndexingResult, QueryType,
    SearchHit, SearchIndexPort, SearchMode, SearchPortError, SearchPortResult, SearchRequest,
    SearchResponse,
};
use indexer_core::{DocumentIndexDto, services::KEY_FIELD};

use crate::client::AzureSearchClient;
use crate::error::AzureSearchError;
use crate::http::HttpBackend;
use crate::models::{
    DocumentBody, FieldBody, IndexActionBody, IndexBatchBody, IndexBody, IndexingResultBody,
    SearchBody, SearchHitBody, SearchResponseBody,
};

// ============================================================================
// Error Mapping
// ============================================================================

/// Convert `AzureSearchError` to the core `SearchPortError`.
fn map_error(err: AzureSearchError, index: &str) -> SearchPortError {
    match err {
        AzureSearchError::ApiRequestFailed {
            status,
            url,
            message,
        } => match status {
            404 => SearchPortError::IndexNotFound {
                index: index.to_string(),
            },
            401 | 403 => SearchPortError::Unauthorized,
            429 => SearchPortError::RateLimited,
            400..=499 => SearchPortError::InvalidRequest {
                message: message.unwrap_or_else(|| format!("status {status}")),
            },
            _ => SearchPortError::Network {
                message: message.map_or_else(
                    || format!("request failed with status {status}: {url}"),
                    |m| format!("request failed with status {status}: {m}"),
                ),
            },
        },
        AzureSearchError::InvalidResponse { message } => {
            SearchPortError::InvalidResponse { message }
        }
        AzureSearchError::Configuration { message } => SearchPortError::Configuration { message },
        AzureSearchError::Network(e) => SearchPortError::Network {
            message: e.to_string(),
        },
        AzureSearchError::InvalidUrl(e) => SearchPortError::Configuration {
            message: e.to_string(),
        },
        AzureSearchError::JsonParse(e) => SearchPortError::InvalidResponse {
            message: e.to_string(),
        },
    }
}

// ============================================================================
// Type Conversions
// ============================================================================

const fn edm_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::String => "Edm.String",
        FieldType::StringCollection => "Collection(Edm.String)",
    }
}

fn to_field_body(field: &IndexField) -> FieldBody {
    FieldBody {
        name: field.name.clone(),
        field_type: edm_type(field.field_type),
        key: field.key,
        retrievable: field.retrievable,
        filterable: field.filterable,
        facetable: field.facetable,
        searchable: field.searchable,
        sortable: field.sortable,
    }
}

fn to_index_body(definition: &IndexDefinition) -> IndexBody {
    IndexBody {
        name: definition.name.clone(),
        fields: definition.fields.iter().map(to_field_body).collect(),
    }
}

fn to_search_body(request: &SearchRequest) -> SearchBody {
    let join = |fields: &[String]| (!fields.is_empty()).then(|| fields.join(","));

    SearchBody {
        search: request.search_text.clone(),
        filter: request.filter.clone(),
        skip: request.skip,
        top: request.top,
        highlight: join(&request.highlight_fields),
        select: join(&request.select),
        orderby: join(&request.order_by),
        query_type: match request.query_type {
            QueryType::Simple => "simple",
            QueryType::Full => "full",
        },
        search_mode: match request.search_mode {
            SearchMode::Any => "any",
            SearchMode::All => "all",
        },
        count: request.include_total_count,
    }
}

fn to_document(body: DocumentBody) -> DocumentIndexDto {
    DocumentIndexDto {
        id: body.id.unwrap_or_default(),
        url: body.url.unwrap_or_default(),
        title: body.title.unwrap_or_default(),
        project_id: body.project_id.unwrap_or_default(),
        project_name: body.project_name.unwrap_or_default(),
        branch_name: body.branch_name.unwrap_or_default(),
        content: body.content.unwrap_or_default(),
        tags: body.tags.unwrap_or_default(),
        file_uri: String::new(),
    }
}

fn to_search_hit(hit: SearchHitBody) -> SearchHit {
    SearchHit {
        score: hit.score,
        highlights: hit.highlights.unwrap_or_default(),
        document: to_document(hit.document),
    }
}

fn to_search_response(body: SearchResponseBody) -> SearchResponse {
    SearchResponse {
        count: body.count,
        results: body.value.into_iter().map(to_search_hit).collect(),
    }
}

fn to_batch_body(batch: &IndexBatch) -> IndexBatchBody<'_> {
    IndexBatchBody {
        value: batch
            .actions
            .iter()
            .map(|action| match action {
                IndexAction::MergeOrUpload(doc) => IndexActionBody::MergeOrUpload(doc),
                IndexAction::Delete { key } => IndexActionBody::Delete { id: key },
            })
            .collect(),
    }
}

fn to_indexing_result(body: IndexingResultBody) -> IndexingResult {
    IndexingResult {
        key: body.key,
        succeeded: body.status,
        status_code: body.status_code,
        error_message: body.error_message,
    }
}

// ============================================================================
// Port Implementation
// ============================================================================

#[async_trait]
impl<B: HttpBackend + Send + Sync> SearchIndexPort for AzureSearchClient<B> {
    async fn create_or_update_index(&self, definition: &IndexDefinition) -> SearchPortResult<()> {
        if definition.key_field() != Some(KEY_FIELD) {
            return Err(SearchPortError::InvalidRequest {
                message: format!("index '{}' must use '{KEY_FIELD}' as key", definition.name),
            });
        }

        self.put_index(&to_index_body(definition))
            .await
            .map_err(|e| map_error(e, &definition.name))
    }

    async fn search(&self, request: &SearchRequest) -> SearchPortResult<SearchResponse> {
        let response = self
            .search_documents(&to_search_body(request))
            .await
            .map_err(|e| map_error(e, self.index_name()))?;
        Ok(to_search_response(response))
    }

    async fn index_batch(&self, batch: &IndexBatch) -> SearchPortResult<Vec<IndexingResult>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .index_documents(&to_batch_body(batch))
            .await
            .map_err(|e| map_error(e, self.index_name()))?;
        Ok(response.value.into_iter().map(to_indexing_result).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::test_endpoint;
    use crate::http::testing::{CannedResponse, FakeBackend};
    use indexer_core::{DocumentModel, document_index_definition};
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn client(backend: FakeBackend) -> AzureSearchClient<FakeBackend> {
        AzureSearchClient::with_backend(test_endpoint(), backend)
    }

    #[test]
    fn test_map_error_statuses() {
        let failed = |status, message: Option<&str>| AzureSearchError::ApiRequestFailed {
            status,
            url: "https://svc/indexes/documents".to_string(),
            message: message.map(ToString::to_string),
        };

        assert!(matches!(
            map_error(failed(404, None), "documents"),
            SearchPortError::IndexNotFound { index } if index == "documents"
        ));
        assert!(matches!(
            map_error(failed(403, None), "documents"),
            SearchPortError::Unauthorized
        ));
        assert!(matches!(
            map_error(failed(429, None), "documents"),
            SearchPortError::RateLimited
        ));
        assert!(matches!(
            map_error(failed(400, Some("Invalid expression")), "documents"),
            SearchPortError::InvalidRequest { message } if message == "Invalid expression"
        ));
        assert!(matches!(
            map_error(failed(503, None), "documents"),
            SearchPortError::Network { .. }
        ));
    }

    #[test]
    fn test_index_body_sends_every_attribute() {
        let body = to_index_body(&document_index_definition("documents"));
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["name"], "documents");
        assert_eq!(
            value["fields"][0],
            json!({
                "name": "id",
                "type": "Edm.String",
                "key": true,
                "retrievable": true,
                "filterable": false,
                "facetable": false,
                "searchable": false,
                "sortable": true
            })
        );

        let tags = &value["fields"][6];
        assert_eq!(tags["name"], "tags");
        assert_eq!(tags["type"], "Collection(Edm.String)");
        assert_eq!(tags["facetable"], true);

        let content = &value["fields"][7];
        assert_eq!(content["searchable"], true);
        assert_eq!(content["retrievable"], false);
    }

    #[test]
    fn test_search_body_conversion() {
        let request = SearchRequest {
            search_text: "rust".to_string(),
            filter: Some("projectId eq 'p1'".to_string()),
            skip: Some(10),
            top: Some(5),
            highlight_fields: vec!["content".to_string()],
            select: vec![],
            order_by: vec!["id asc".to_string()],
            query_type: QueryType::Full,
            search_mode: SearchMode::All,
            include_total_count: true,
        };

        let value = serde_json::to_value(to_search_body(&request)).unwrap();
        assert_eq!(
            value,
            json!({
                "search": "rust",
                "filter": "projectId eq 'p1'",
                "skip": 10,
                "top": 5,
                "highlight": "content",
                "orderby": "id asc",
                "queryType": "full",
                "searchMode": "all",
                "count": true
            })
        );
    }

    #[tokio::test]
    async fn test_create_or_update_index() {
        let backend =
            FakeBackend::new().with_response("/indexes/documents", CannedResponse::ok(json!({})));
        let client = client(backend);

        assert_ok!(
            client
                .create_or_update_index(&document_index_definition("documents"))
                .await
        );

        let request = &client.backend.requests()[0];
        assert_eq!(request.method, "PUT");
        assert_eq!(request.body["fields"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_create_index_rejects_foreign_key_field() {
        let client = client(FakeBackend::new());
        let definition = IndexDefinition {
            name: "documents".to_string(),
            fields: vec![IndexField::new("url", FieldType::String).key()],
        };

        let err = assert_err!(client.create_or_update_index(&definition).await);
        assert!(matches!(err, SearchPortError::InvalidRequest { .. }));
        assert!(client.backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_search_maps_hits() {
        let backend = FakeBackend::new().with_response(
            "/docs/search",
            CannedResponse::ok(json!({
                "@odata.count": 12,
                "value": [{
                    "@search.score": 0.75,
                    "@search.highlights": {"content": ["a <em>rust</em> book"]},
                    "id": "a",
                    "url": "master/docs/a.md",
                    "title": null,
                    "projectId": "p1",
                    "projectName": "P1",
                    "branchName": "master",
                    "tags": ["guide"]
                }]
            })),
        );
        let client = client(backend);

        let response = client
            .search(&SearchRequest {
                search_text: "rust".to_string(),
                include_total_count: true,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(response.count, Some(12));
        let hit = &response.results[0];
        assert!((hit.score - 0.75).abs() < f64::EPSILON);
        assert_eq!(hit.highlights["content"], vec!["a <em>rust</em> book"]);
        assert_eq!(hit.document.id, "a");
        assert_eq!(hit.document.title, "");
        assert_eq!(hit.document.tags, vec!["guide"]);
    }

    #[tokio::test]
    async fn test_search_missing_index() {
        let client = client(FakeBackend::new().with_response(
            "/docs/search",
            CannedResponse {
                status: 404,
                json: json!({"error": {"message": "The index 'documents' was not found."}}),
            },
        ));

        let err = assert_err!(client.search(&SearchRequest::default()).await);
        assert!(matches!(err, SearchPortError::IndexNotFound { index } if index == "documents"));
    }

    #[tokio::test]
    async fn test_index_batch_sends_actions_and_reads_results() {
        let backend = FakeBackend::new().with_response(
            "/docs/index",
            CannedResponse {
                status: 207,
                json: json!({"value": [
                    {"key": "a", "status": true, "errorMessage": null, "statusCode": 200},
                    {"key": "b", "status": false, "errorMessage": "Document not found", "statusCode": 404}
                ]}),
            },
        );
        let client = client(backend);

        let mut batch = IndexBatch::merge_or_upload(vec![DocumentModel {
            id: "a".to_string(),
            content: "body".to_string(),
            ..Default::default()
        }]);
        batch.actions.push(IndexAction::Delete {
            key: "b".to_string(),
        });

        let results = assert_ok!(client.index_batch(&batch).await);
        assert_eq!(results.len(), 2);
        assert!(results[0].succeeded);
        assert!(!results[1].succeeded);
        assert_eq!(results[1].status_code, 404);
        assert_eq!(results[1].error_message.as_deref(), Some("Document not found"));

        let body = &client.backend.requests()[0].body;
        assert_eq!(body["value"][0]["@search.action"], "mergeOrUpload");
        assert_eq!(body["value"][0]["content"], "body");
        assert_eq!(body["value"][1], json!({"@search.action": "delete", "id": "b"}));
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        let client = client(FakeBackend::new());
        let results = client.index_batch(&IndexBatch::default()).await.unwrap();
        assert!(results.is_empty());
        assert!(client.backend.requests().is_empty());
    }
}
