//! Shared helpers for indexer-axum integration tests.

// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use indexer_axum::{Authenticator, AxumContext, create_router};
use indexer_core::testing::InMemorySearchIndex;
use indexer_core::{DocumentModel, IndexerSettings, SearchService};
use tower::ServiceExt;

/// Static token accepted by [`secured_settings`].
pub const TEST_SECURITY_TOKEN: &str = "s3cret";

/// Settings with a configured search service and no authentication.
pub fn search_settings() -> IndexerSettings {
    IndexerSettings {
        azure_search_service_name: Some("svc".to_string()),
        azure_search_index_name: Some("documents".to_string()),
        azure_search_api_key: Some("key".to_string()),
        ..IndexerSettings::default()
    }
}

/// [`search_settings`] plus a static security token.
pub fn secured_settings() -> IndexerSettings {
    IndexerSettings {
        security_token: Some(TEST_SECURITY_TOKEN.to_string()),
        ..search_settings()
    }
}

pub fn document(id: &str, project: &str, branch: &str, content: &str) -> DocumentModel {
    DocumentModel {
        id: id.to_string(),
        url: format!("{branch}/docs/{id}.md"),
        title: format!("Title {id}"),
        project_id: project.to_string(),
        project_name: format!("Project {project}"),
        branch_name: branch.to_string(),
        content: content.to_string(),
        tags: vec!["docs".to_string()],
    }
}

/// Build a router over `index` with the given settings.
pub fn router(index: Arc<InMemorySearchIndex>, settings: IndexerSettings) -> Router {
    let auth = Authenticator::from_settings(&settings, reqwest::Client::new());
    let search = SearchService::new(index, settings);
    create_router(AxumContext::new(search, auth))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_auth(uri: &str, authorization: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", authorization)
        .body(Body::empty())
        .unwrap()
}

/// Send one request through the router.
pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
