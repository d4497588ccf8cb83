#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use tower as _;

pub mod auth;
pub mod bootstrap;
pub mod discovery;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod versioning;

// Re-export primary types
pub use auth::{AuthError, AuthScheme, Authenticator};
pub use bootstrap::{
    AxumContext, DEFAULT_PORT, ServerConfig, bootstrap, bootstrap_with_index, start_server,
};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
