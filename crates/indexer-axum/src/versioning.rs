//! API version negotiation.
//!
//! Clients may pick an API version with the `api-version` query parameter
//! or header. Only `1.0` exists; omitting the version selects it. Every
//! response advertises the supported versions.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::HttpError;

/// Query parameter and request header naming the requested version.
pub const API_VERSION_PARAM: &str = "api-version";

/// Response header listing supported versions.
pub const SUPPORTED_VERSIONS_HEADER: &str = "api-supported-versions";

/// The only API version.
pub const CURRENT_VERSION: &str = "1.0";

/// Requested API version, if the request names one.
///
/// The query string wins over the header.
fn requested_version(req: &Request) -> Option<String> {
    let from_query = req.uri().query().and_then(|query| {
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key.eq_ignore_ascii_case(API_VERSION_PARAM))
            .map(|(_, value)| value.into_owned())
    });

    from_query.or_else(|| {
        req.headers()
            .get(API_VERSION_PARAM)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    })
}

/// Whether `version` names a supported API version.
pub fn is_supported(version: &str) -> bool {
    matches!(version.trim(), "1" | "1.0")
}

/// Middleware rejecting unsupported versions and tagging responses.
pub async fn api_version(req: Request, next: Next) -> Response {
    let mut response = match requested_version(&req) {
        Some(version) if !is_supported(&version) => HttpError::BadRequest(format!(
            "The HTTP resource does not support the API version '{version}'"
        ))
        .into_response(),
        _ => next.run(req).await,
    };

    response.headers_mut().insert(
        SUPPORTED_VERSIONS_HEADER,
        HeaderValue::from_static(CURRENT_VERSION),
    );
    response
}
