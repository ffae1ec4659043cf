// src/error/catalog_error.rs
//
// The closed set of failures the presentation layer has to render.
// Every gateway failure is reduced to one of these before it reaches
// engine state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CatalogError {
    /// No usable API key (blank, or rejected by the upstream)
    #[error("API key is missing or invalid")]
    ApiKeyMissing,

    /// Host could not be resolved
    #[error("No internet connection")]
    NoInternet,

    /// Connection, timeout or body read failure
    #[error("Network error")]
    NetworkTransport,

    /// Upstream answered with a 5xx status
    #[error("Server error")]
    ServerError,

    /// Upstream answered with an error we have no dedicated handling for
    #[error("{0}")]
    ApiError(String),

    #[error("Unknown error")]
    Unknown,
}

impl CatalogError {
    /// Whether retrying the same request may succeed without user action
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CatalogError::NoInternet | CatalogError::NetworkTransport | CatalogError::ServerError
        )
    }
}
