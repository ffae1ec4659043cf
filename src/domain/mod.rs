// src/domain/mod.rs
//
// Domain Root - catalog values, view states and the favorites overlay.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod favorites;
pub mod item;
pub mod query;
pub mod state;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use favorites::{FavoriteSet, FavoritesMerger};
pub use item::{Item, ItemId};
pub use query::{
    validate_page, validate_search_query, DiscoverQuery, FilterOptions, PageCursor, PageResult,
    SortOption,
};
pub use state::{AsyncActionState, AuthFlowState, DetailState, ListState};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of request invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
