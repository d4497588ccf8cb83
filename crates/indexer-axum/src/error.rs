//! Axum-specific error types and mappings.
//!
//! Maps `CoreError` (and the search port errors it wraps) and extractor
//! rejections to HTTP status codes and JSON response bodies.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use indexer_core::{CoreError, SearchPortError};
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The upstream search service failed or rejected our credentials.
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Service unavailable (not configured, or throttled upstream).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The request could not be extracted (bad body, query or path).
    #[error("Rejected request: {message}")]
    Rejected { status: StatusCode, message: String },
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Rejected { status, .. } => *status,
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            Self::NotFound(msg)
            | Self::BadRequest(msg)
            | Self::BadGateway(msg)
            | Self::ServiceUnavailable(msg)
            | Self::Rejected { message: msg, .. } => msg,
        };

        if status.is_server_error() {
            tracing::error!(target: "indexer.http", status = status.as_u16(), %error, "Request failed");
        }

        let body = ErrorBody {
            error,
            status: status.as_u16(),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for HttpError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SearchIndex(port_err) => port_err.into(),
            CoreError::Validation(msg) => Self::BadRequest(msg),
            CoreError::Configuration(msg) => Self::ServiceUnavailable(msg),
        }
    }
}

impl From<SearchPortError> for HttpError {
    fn from(err: SearchPortError) -> Self {
        match err {
            SearchPortError::IndexNotFound { .. } => Self::NotFound(err.to_string()),
            SearchPortError::InvalidRequest { message } => Self::BadRequest(message),
            SearchPortError::RateLimited | SearchPortError::Configuration { .. } => {
                Self::ServiceUnavailable(err.to_string())
            }
            SearchPortError::Unauthorized
            | SearchPortError::Network { .. }
            | SearchPortError::InvalidResponse { .. } => Self::BadGateway(err.to_string()),
        }
    }
}

macro_rules! impl_from_rejection {
    ($($rejection:ty),*) => {$(
        impl From<$rejection> for HttpError {
            fn from(rejection: $rejection) -> Self {
                Self::Rejected {
                    status: rejection.status(),
                    message: rejection.body_text(),
                }
            }
        }
    )*};
}

impl_from_rejection!(JsonRejection, PathRejection, QueryRejection);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_statuses() {
        let cases = [
            (CoreError::Validation("no id".into()), StatusCode::BAD_REQUEST),
            (
                CoreError::Configuration("disabled".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                CoreError::SearchIndex(SearchPortError::IndexNotFound {
                    index: "documents".into(),
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                CoreError::SearchIndex(SearchPortError::Unauthorized),
                StatusCode::BAD_GATEWAY,
            ),
            (
                CoreError::SearchIndex(SearchPortError::RateLimited),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                CoreError::SearchIndex(SearchPortError::InvalidRequest {
                    message: "bad filter".into(),
                }),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(HttpError::from(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn test_rejection_keeps_status_and_uses_json_body() {
        use http_body_util::BodyExt;

        let err = HttpError::Rejected {
            status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
            message: "Expected request with `Content-Type: application/json`".into(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], 415);
        assert!(body["error"].as_str().unwrap().contains("Content-Type"));
    }

    #[test]
    fn test_into_response_status() {
        let response = HttpError::BadRequest("nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
