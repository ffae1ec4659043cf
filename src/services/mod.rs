// src/services/mod.rs
//
// Services Module - Orchestration Layer
//
// The gateway talks to the backends, FavoritesService owns favorite writes,
// and each sync engine owns one observable view state.

pub mod assistant_sync_engine;
pub mod auth_sync_engine;
pub mod catalog_gateway;
pub mod detail_sync_engine;
pub mod favorites_service;
pub mod list_sync_engine;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export all services and their types
pub use assistant_sync_engine::{item_prompt, AssistantState, AssistantSyncEngine};

pub use auth_sync_engine::AuthSyncEngine;

pub use catalog_gateway::{CatalogGateway, GatewayResult};

pub use detail_sync_engine::DetailSyncEngine;

pub use favorites_service::FavoritesService;

pub use list_sync_engine::{ListSource, ListSyncEngine, SyncConfig};
