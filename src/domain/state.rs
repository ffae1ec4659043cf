// src/domain/state.rs
//
// Observable view states. One sum type per state kind, generic over the
// payload, reused by every engine that needs it.

use serde::Serialize;

use super::ItemId;
use crate::error::CatalogError;

/// State of a paginated collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ListState<T> {
    Loading,
    Success { data: T, is_last_page: bool },
    Error { error: CatalogError },
}

impl<T> ListState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ListState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ListState::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CatalogError> {
        match self {
            ListState::Error { error } => Some(error),
            _ => None,
        }
    }

    pub fn is_last_page(&self) -> bool {
        matches!(self, ListState::Success { is_last_page: true, .. })
    }
}

/// State of a single item fetch. The error keeps the id so a retry can
/// target the same item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetailState<T> {
    Loading,
    Success { data: T },
    Error { error: CatalogError, item_id: ItemId },
}

impl<T> DetailState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            DetailState::Success { data } => Some(data),
            _ => None,
        }
    }
}

/// One-shot action. Idle is the rest state before the first invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AsyncActionState<T, E = String> {
    Idle,
    Loading,
    Success { data: T },
    Error { error: E },
}

impl<T, E> AsyncActionState<T, E> {
    pub fn is_idle(&self) -> bool {
        matches!(self, AsyncActionState::Idle)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            AsyncActionState::Success { data } => Some(data),
            _ => None,
        }
    }
}

/// Login flow. Strictly forward: Idle -> Loading -> TokenCreated ->
/// (approval out of band) -> Loading -> Authenticated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthFlowState<T> {
    Idle,
    Loading,
    TokenCreated { token: T },
    Authenticated,
    Error { message: String },
}

impl<T> AuthFlowState<T> {
    pub fn token(&self) -> Option<&T> {
        match self {
            AuthFlowState::TokenCreated { token } => Some(token),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthFlowState::Authenticated)
    }
}
