//! Integration tests for CORS preflight and `/api` authentication.
//!
//! Verifies that the server correctly handles:
//! - OPTIONS preflight requests with proper CORS headers
//! - `SecureToken` and `Bearer` authentication on /api/* endpoints
//! - Unauthenticated access to the /health endpoint

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::routing::get;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use indexer_core::IndexerSettings;
use indexer_core::testing::InMemorySearchIndex;

use common::{
    TEST_SECURITY_TOKEN, document, get as get_request, get_with_auth, router, search_settings,
    secured_settings, send,
};

const GOOD_TOKEN_AUDIENCE: &str = "indexer-api";

fn index() -> Arc<InMemorySearchIndex> {
    Arc::new(InMemorySearchIndex::new().with_documents([document("a1", "alpha", "main", "text")]))
}

/// Build an unsigned JWT carrying `claims`.
fn jwt(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

fn valid_jwt(subject: &str) -> String {
    jwt(&serde_json::json!({
        "sub": subject,
        "aud": GOOD_TOKEN_AUDIENCE,
        "exp": chrono::Utc::now().timestamp() + 600,
    }))
}

/// A fake OAuth authority. `userinfo` accepts tokens whose `sub` claim is
/// not "revoked" and counts how often it is asked.
async fn fake_authority() -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let discovery = serde_json::json!({
        "issuer": &base,
        "userinfo_endpoint": format!("{base}/connect/userinfo"),
    });
    let counter = calls.clone();
    let app = Router::new()
        .route(
            "/.well-known/openid-configuration",
            get(move || async move { axum::Json(discovery) }),
        )
        .route(
            "/connect/userinfo",
            get(move |headers: HeaderMap| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let token = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.strip_prefix("Bearer "))
                    .unwrap_or_default()
                    .to_string();
                if token.is_empty() || token == valid_jwt_for_revoked() {
                    StatusCode::UNAUTHORIZED
                } else {
                    StatusCode::OK
                }
            }),
        );

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (base, calls)
}

fn valid_jwt_for_revoked() -> String {
    // Expiry far in the future keeps the token stable across calls.
    jwt(&serde_json::json!({
        "sub": "revoked",
        "aud": GOOD_TOKEN_AUDIENCE,
        "exp": 4_102_444_800_i64,
    }))
}

fn oauth_settings(authority: &str) -> IndexerSettings {
    IndexerSettings {
        oauth_authority: Some(authority.to_string()),
        oauth_audience: Some(GOOD_TOKEN_AUDIENCE.to_string()),
        ..search_settings()
    }
}

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let app = router(index(), secured_settings());

    let response = send(app, get_request("/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_api_without_credentials_is_unauthorized() {
    let app = router(index(), secured_settings());

    let response = send(app, get_request("/api/search")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let challenge = response.headers()[header::WWW_AUTHENTICATE].to_str().unwrap();
    assert!(challenge.contains("SecureToken"));
    assert!(challenge.contains("Bearer"));
}

#[tokio::test]
async fn test_secure_token_grants_access() {
    let app = router(index(), secured_settings());

    let response = send(
        app,
        get_with_auth("/api/search", &format!("SecureToken {TEST_SECURITY_TOKEN}")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_secure_token_is_unauthorized() {
    let app = router(index(), secured_settings());

    let response = send(app, get_with_auth("/api/search", "SecureToken wrong")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_scheme_is_unauthorized() {
    let app = router(index(), secured_settings());

    let response = send(app, get_with_auth("/api/search", "Basic dXNlcjpwYXNz")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_is_open_without_auth_settings() {
    let app = router(index(), search_settings());

    let response = send(app, get_request("/api/search")).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unsupported_version_checked_before_auth() {
    let app = router(index(), secured_settings());

    let response = send(app, get_request("/api/search?api-version=3.0")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bearer_token_confirmed_and_cached() {
    let (authority, calls) = fake_authority().await;
    let app = router(index(), oauth_settings(&authority));
    let token = valid_jwt("alice");

    for _ in 0..3 {
        let response = send(
            app.clone(),
            get_with_auth("/api/search", &format!("Bearer {token}")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_bearer_token_rejected_by_authority() {
    let (authority, calls) = fake_authority().await;
    let app = router(index(), oauth_settings(&authority));

    let response = send(
        app,
        get_with_auth("/api/search", &format!("Bearer {}", valid_jwt_for_revoked())),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_expired_bearer_token_is_not_sent_to_authority() {
    let (authority, calls) = fake_authority().await;
    let app = router(index(), oauth_settings(&authority));
    let token = jwt(&serde_json::json!({
        "aud": GOOD_TOKEN_AUDIENCE,
        "exp": chrono::Utc::now().timestamp() - 60,
    }));

    let response = send(app, get_with_auth("/api/search", &format!("Bearer {token}"))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_bearer_token_for_other_audience_is_unauthorized() {
    let (authority, calls) = fake_authority().await;
    let app = router(index(), oauth_settings(&authority));
    let token = jwt(&serde_json::json!({
        "aud": "someone-else",
        "exp": chrono::Utc::now().timestamp() + 600,
    }));

    let response = send(app, get_with_auth("/api/search", &format!("Bearer {token}"))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cors_preflight_allowed() {
    let app = router(index(), secured_settings());

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/search")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
