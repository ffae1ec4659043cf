// src/error/classifier.rs
//
// Maps raw transport failures to the CatalogError taxonomy.
//
// The rules form a strict priority list. A blank API key wins over
// everything else, whatever the underlying failure says.

use log::{error, warn};

use crate::error::CatalogError;
use crate::integrations::TransportFailure;

/// Marker the upstream puts in 401 bodies
const INVALID_KEY_MARKER: &str = "Invalid API key";

pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn classify(failure: &TransportFailure, api_key_configured: bool) -> CatalogError {
        if !api_key_configured {
            return CatalogError::ApiKeyMissing;
        }

        match failure {
            TransportFailure::HostUnresolved(_) => CatalogError::NoInternet,
            TransportFailure::Other(text) if TransportFailure::is_host_resolution_text(text) => {
                CatalogError::NoInternet
            }
            TransportFailure::Io(_) => CatalogError::NetworkTransport,
            TransportFailure::Status { status, message } => {
                Self::classify_status(*status, message)
            }
            TransportFailure::Other(text) => {
                error!("Unknown error: {}", text);
                CatalogError::Unknown
            }
        }
    }

    fn classify_status(status: u16, message: &str) -> CatalogError {
        if (500..=599).contains(&status) {
            CatalogError::ServerError
        } else if status == 401 || message.contains(INVALID_KEY_MARKER) {
            CatalogError::ApiKeyMissing
        } else {
            warn!("Unexpected response error ({}): {}", status, message);
            CatalogError::ApiError(message.to_string())
        }
    }
}
