// src/repositories/mod.rs
//
// Persistence collaborators
//
// CRITICAL RULES:
// - Stores are DUMB holders of a single value each
// - NO business logic
// - NO event emission
// - Every store publishes its value through a watch channel
//
// Durable storage is left to the host application; the in-memory
// implementations here back tests and embedders without persistence.

pub mod favorites_store;
pub mod key_config_store;
pub mod session_store;

pub use favorites_store::{FavoritesStore, InMemoryFavoritesStore};
pub use key_config_store::{ApiKeyKind, InMemoryKeyConfigStore, KeyConfigStore};
pub use session_store::{InMemorySessionStore, SessionStore};
