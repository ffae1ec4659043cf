// src/error/types.rs
use crate::integrations::TransportFailure;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportFailure),

    #[error("No active session")]
    NoActiveSession,

    /// Raised by host store implementations when a write cannot be persisted
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_session_message() {
        assert_eq!(AppError::NoActiveSession.to_string(), "No active session");
    }

    #[test]
    fn test_transport_failure_converts() {
        let error: AppError = TransportFailure::HostUnresolved("dns".to_string()).into();
        assert!(matches!(error, AppError::Transport(_)));
    }

    #[test]
    fn test_serializes_as_message() {
        let json = serde_json::to_string(&AppError::Storage("disk full".to_string())).unwrap();
        assert_eq!(json, "\"Storage error: disk full\"");
    }
}
