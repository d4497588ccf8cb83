//! Request authentication for `/api`.
//!
//! Two `Authorization` schemes are accepted:
//!
//! - `SecureToken <token>`: compared with the configured static token.
//! - `Bearer <jwt>`: the token's `exp` and `aud` claims are checked, then the
//!   token is confirmed against the OAuth authority's OIDC `userinfo`
//!   endpoint. Confirmed tokens are cached until they expire, at most for
//!   [`MAX_CONFIRMATION_TTL`].
//!
//! With neither scheme configured, authentication is off.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use indexer_core::IndexerSettings;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{OnceCell, RwLock};

use crate::state::AppState;

/// `WWW-Authenticate` challenge sent with 401 responses.
pub const AUTH_CHALLENGE: &str = "SecureToken, Bearer";

/// Longest time a confirmed bearer token is trusted without asking again.
pub const MAX_CONFIRMATION_TTL: Duration = Duration::from_secs(300);

/// Path of the OIDC discovery document below the authority.
const OPENID_CONFIGURATION_PATH: &str = ".well-known/openid-configuration";

/// Why a request was not authenticated.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    Missing,

    #[error("unsupported authorization scheme")]
    UnsupportedScheme,

    #[error("invalid security token")]
    InvalidSecurityToken,

    #[error("malformed bearer token: {0}")]
    Malformed(String),

    #[error("bearer token has expired")]
    Expired,

    #[error("bearer token audience does not match")]
    AudienceMismatch,

    #[error("bearer token was rejected by the authority")]
    Rejected,

    #[error("authority request failed: {0}")]
    Authority(String),
}

/// Scheme a request authenticated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    SecureToken,
    Bearer,
}

/// Validates `Authorization` headers.
pub struct Authenticator {
    security_token: Option<String>,
    bearer: Option<BearerValidator>,
}

impl Authenticator {
    /// Build an authenticator from settings.
    ///
    /// `client` is used for requests to the OAuth authority.
    pub fn from_settings(settings: &IndexerSettings, client: reqwest::Client) -> Self {
        Self {
            security_token: settings.security_token().map(ToString::to_string),
            bearer: settings.oauth_authority().map(|authority| {
                BearerValidator::new(
                    authority,
                    settings.oauth_audience().map(ToString::to_string),
                    client,
                )
            }),
        }
    }

    /// An authenticator that lets every request through.
    pub const fn disabled() -> Self {
        Self {
            security_token: None,
            bearer: None,
        }
    }

    pub const fn is_enabled(&self) -> bool {
        self.security_token.is_some() || self.bearer.is_some()
    }

    /// Validate the value of an `Authorization` header.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<AuthScheme, AuthError> {
        let value = authorization.map(str::trim).filter(|v| !v.is_empty());
        let (scheme, credentials) = value
            .ok_or(AuthError::Missing)?
            .split_once(' ')
            .ok_or(AuthError::UnsupportedScheme)?;
        let credentials = credentials.trim();

        if scheme.eq_ignore_ascii_case("SecureToken") {
            let expected = self
                .security_token
                .as_deref()
                .ok_or(AuthError::UnsupportedScheme)?;
            return if credentials == expected {
                Ok(AuthScheme::SecureToken)
            } else {
                Err(AuthError::InvalidSecurityToken)
            };
        }

        if scheme.eq_ignore_ascii_case("Bearer") {
            let validator = self.bearer.as_ref().ok_or(AuthError::UnsupportedScheme)?;
            validator.validate(credentials).await?;
            return Ok(AuthScheme::Bearer);
        }

        Err(AuthError::UnsupportedScheme)
    }
}

// ============================================================================
// Bearer tokens
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    fn contains(&self, audience: &str) -> bool {
        match self {
            Self::One(aud) => aud == audience,
            Self::Many(auds) => auds.iter().any(|a| a == audience),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
    aud: Option<Audience>,
}

#[derive(Debug, Deserialize)]
struct OpenIdConfiguration {
    userinfo_endpoint: Option<String>,
}

/// Decode the claims of a JWT without verifying its signature.
fn decode_claims(token: &str) -> Result<Claims, AuthError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::Malformed("expected three segments".to_string()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::Malformed(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| AuthError::Malformed(e.to_string()))
}

struct BearerValidator {
    authority: String,
    audience: Option<String>,
    client: reqwest::Client,
    userinfo_endpoint: OnceCell<String>,
    confirmed: RwLock<HashMap<String, Instant>>,
}

impl BearerValidator {
    fn new(authority: &str, audience: Option<String>, client: reqwest::Client) -> Self {
        Self {
            authority: authority.trim_end_matches('/').to_string(),
            audience,
            client,
            userinfo_endpoint: OnceCell::new(),
            confirmed: RwLock::new(HashMap::new()),
        }
    }

    async fn validate(&self, token: &str) -> Result<(), AuthError> {
        let claims = decode_claims(token)?;

        let now = chrono::Utc::now().timestamp();
        let exp = claims
            .exp
            .ok_or_else(|| AuthError::Malformed("missing exp claim".to_string()))?;
        if exp <= now {
            return Err(AuthError::Expired);
        }

        if let Some(expected) = &self.audience {
            if !claims.aud.is_some_and(|aud| aud.contains(expected)) {
                return Err(AuthError::AudienceMismatch);
            }
        }

        if self
            .confirmed
            .read()
            .await
            .get(token)
            .is_some_and(|until| *until > Instant::now())
        {
            return Ok(());
        }

        self.confirm(token).await?;

        let remaining = Duration::from_secs(u64::try_from(exp - now).unwrap_or(0));
        let until = Instant::now() + remaining.min(MAX_CONFIRMATION_TTL);
        let mut confirmed = self.confirmed.write().await;
        confirmed.retain(|_, expiry| *expiry > Instant::now());
        confirmed.insert(token.to_string(), until);
        Ok(())
    }

    /// Ask the authority whether the token is still good.
    async fn confirm(&self, token: &str) -> Result<(), AuthError> {
        let endpoint = self.userinfo_endpoint().await?;
        let response = self
            .client
            .get(endpoint)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Authority(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            tracing::debug!(
                target: "indexer.auth",
                status = response.status().as_u16(),
                "Authority rejected bearer token"
            );
            Err(AuthError::Rejected)
        }
    }

    async fn userinfo_endpoint(&self) -> Result<&str, AuthError> {
        self.userinfo_endpoint
            .get_or_try_init(|| async {
                let url = format!("{}/{OPENID_CONFIGURATION_PATH}", self.authority);
                let config: OpenIdConfiguration = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(|e| AuthError::Authority(e.to_string()))?
                    .json()
                    .await
                    .map_err(|e| AuthError::Authority(e.to_string()))?;

                let endpoint = config.userinfo_endpoint.ok_or_else(|| {
                    AuthError::Authority(format!("{url} has no userinfo_endpoint"))
                })?;
                tracing::info!(target: "indexer.auth", %endpoint, "Discovered userinfo endpoint");
                Ok::<_, AuthError>(endpoint)
            })
            .await
            .map(String::as_str)
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Middleware rejecting unauthenticated requests with 401.
pub async fn require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if !state.auth.is_enabled() {
        return next.run(req).await;
    }

    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    match state.auth.authenticate(authorization.as_deref()).await {
        Ok(scheme) => {
            tracing::debug!(target: "indexer.auth", ?scheme, "Request authenticated");
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!(
                target: "indexer.auth",
                path = %req.uri().path(),
                reason = %e,
                "Unauthorized API request"
            );
            unauthorized()
        }
    }
}

fn unauthorized() -> Response {
    let mut res = Response::new(axum::body::Body::empty());
    *res.status_mut() = StatusCode::UNAUTHORIZED;
    res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static(AUTH_CHALLENGE),
    );
    res
}
