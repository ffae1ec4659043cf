// events/types.rs
//
// Domain events. Each one is an immutable fact that has already happened.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events carry only the data needed to react

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ItemId;

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    fn event_id(&self) -> Uuid;

    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

// ============================================================================
// FAVORITES
// ============================================================================

/// Emitted after the FavoritesStore accepted a membership change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteToggled {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub item_id: ItemId,
    pub is_favorite: bool,
}

impl FavoriteToggled {
    pub fn new(item_id: ItemId, is_favorite: bool) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            item_id,
            is_favorite,
        }
    }
}

impl DomainEvent for FavoriteToggled {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "FavoriteToggled" }
}

// ============================================================================
// ACCOUNT
// ============================================================================

/// Emitted once an approved token was exchanged and the session persisted.
/// The session id itself is deliberately not carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEstablished {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl SessionEstablished {
    pub fn new() -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
        }
    }
}

impl Default for SessionEstablished {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainEvent for SessionEstablished {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "SessionEstablished" }
}

/// Emitted when the upstream created a user list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCreated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub list_id: i64,
    pub name: String,
}

impl ListCreated {
    pub fn new(list_id: i64, name: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            list_id,
            name,
        }
    }
}

impl DomainEvent for ListCreated {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "ListCreated" }
}
