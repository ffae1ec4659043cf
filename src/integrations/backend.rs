// src/integrations/backend.rs
//
// Transport contracts consumed by the CatalogGateway.
//
// CRITICAL RULES:
// - Backends speak wire DTOs and raw failures only
// - No classification here; the gateway owns that
// - No favorites, no engine state

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DiscoverQuery, Item, ItemId, PageResult};

/// Raw failure signal from a transport call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    /// DNS lookup failed (the device is most likely offline)
    #[error("Host resolution failed: {0}")]
    HostUnresolved(String),

    /// Connect, timeout or body read failure
    #[error("I/O failure: {0}")]
    Io(String),

    /// Upstream answered with a non-success status
    #[error("Response error {status}: {message}")]
    Status { status: u16, message: String },

    /// Anything the transport could not put in a better bucket
    #[error("{0}")]
    Other(String),
}

impl TransportFailure {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        TransportFailure::Status {
            status,
            message: message.into(),
        }
    }

    /// Whether a free-form failure text describes a host resolution problem.
    pub fn is_host_resolution_text(text: &str) -> bool {
        const MARKERS: [&str; 5] = [
            "dns error",
            "failed to lookup address",
            "name or service not known",
            "nodename nor servname",
            "unknownhost",
        ];
        let lowered = text.to_lowercase();
        MARKERS.iter().any(|marker| lowered.contains(marker))
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        // reqwest hides the resolver error in the source chain
        let mut chain = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            chain.push_str(": ");
            chain.push_str(&cause.to_string());
            source = cause.source();
        }

        if TransportFailure::is_host_resolution_text(&chain) {
            TransportFailure::HostUnresolved(chain)
        } else if let Some(status) = err.status() {
            TransportFailure::status(status.as_u16(), chain)
        } else if err.is_connect() || err.is_timeout() || err.is_body() || err.is_request() {
            TransportFailure::Io(chain)
        } else {
            TransportFailure::Other(chain)
        }
    }
}

/// Response of the request-token endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub success: bool,
    #[serde(default)]
    pub request_token: String,
}

/// Response of the session endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success: bool,
    #[serde(default)]
    pub session_id: String,
}

/// Response of the list creation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateListResponse {
    pub success: bool,
    #[serde(default)]
    pub list_id: i64,
    #[serde(default)]
    pub status_message: String,
}

/// Catalog transport (TMDB-shaped)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    async fn discover(
        &self,
        api_key: &str,
        query: &DiscoverQuery,
    ) -> Result<PageResult, TransportFailure>;

    async fn search(
        &self,
        api_key: &str,
        query: &str,
        page: u32,
    ) -> Result<PageResult, TransportFailure>;

    async fn get_detail(&self, id: ItemId, api_key: &str) -> Result<Item, TransportFailure>;

    async fn create_token(&self, api_key: &str) -> Result<TokenResponse, TransportFailure>;

    async fn create_session(
        &self,
        api_key: &str,
        approved_token: &str,
    ) -> Result<SessionResponse, TransportFailure>;

    async fn create_list(
        &self,
        api_key: &str,
        session_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreateListResponse, TransportFailure>;
}

/// Free-text assistant transport
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    async fn ask(&self, api_key: &str, prompt: &str) -> Result<String, TransportFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_resolution_text() {
        assert!(TransportFailure::is_host_resolution_text(
            "error sending request: dns error: failed to lookup address information"
        ));
        assert!(TransportFailure::is_host_resolution_text(
            "java.net.UnknownHostException: api.themoviedb.org"
        ));
        assert!(!TransportFailure::is_host_resolution_text("connection refused"));
    }

    #[test]
    fn test_token_response_tolerates_missing_token() {
        let response: TokenResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(!response.success);
        assert!(response.request_token.is_empty());
    }
}
