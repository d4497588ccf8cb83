#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]
// DefaultAzureSearchClient is used through the SearchIndexPort trait; its
// backend parameter is an internal type.
#![allow(private_interfaces, private_bounds)]

mod client;
mod config;
mod error;
mod http;
mod models;
mod port;
mod url;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::DefaultAzureSearchClient;

// Configuration
pub use config::{AzureSearchConfig, DEFAULT_API_VERSION};

// Errors
pub use error::AzureSearchError;
