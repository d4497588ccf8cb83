//! Route definitions and router construction.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::get;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::bootstrap::AxumContext;
use crate::handlers;
use crate::state::AppState;
use crate::versioning::api_version;

/// Largest request body accepted on `/api` (document uploads).
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Allow-all CORS layer (any origin, method and header).
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// API routes without the `/api` prefix (for nesting under /api).
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(handlers::search::search))
        .route(
            "/search/projects/{projectId}/branches/{branchName}",
            get(handlers::search::search_in_branch)
                .post(handlers::search::upload)
                .delete(handlers::search::delete),
        )
}

/// Create the main router.
///
/// `/api` requires authentication and a supported API version; `/health`
/// is open.
pub fn create_router(ctx: AxumContext) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer();

    let api = api_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(middleware::from_fn(api_version))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
