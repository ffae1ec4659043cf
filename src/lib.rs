// src/lib.rs
// catalog-sync - State synchronization core for a movie catalog client
//
// Architecture:
// - Engines own observable view state; the presentation layer only reads
// - One gateway: every upstream failure leaves it as a CatalogError
// - Event-driven: favorite toggles reach every engine through the bus
// - Latest request wins: superseded responses never commit
// - Explicit: no implicit behavior, no magic

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod domain;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;
pub mod integrations;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    validate_page,
    validate_search_query,
    // View states
    AsyncActionState,
    AuthFlowState,
    DetailState,
    // Queries
    DiscoverQuery,
    // Favorites
    FavoriteSet,
    FavoritesMerger,
    FilterOptions,
    // Catalog
    Item,
    ItemId,
    ListState,
    PageCursor,
    PageResult,
    SortOption,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult, CatalogError, ErrorClassifier};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus, DomainEvent, EventBus, EventLogEntry, FavoriteToggled, ListCreated,
    SessionEstablished,
};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    ApiKeyKind, FavoritesStore, InMemoryFavoritesStore, InMemoryKeyConfigStore,
    InMemorySessionStore, KeyConfigStore, SessionStore,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    // Assistant
    AssistantState,
    AssistantSyncEngine,
    // Auth
    AuthSyncEngine,
    // Gateway
    CatalogGateway,
    // Detail
    DetailSyncEngine,
    // Favorites
    FavoritesService,
    GatewayResult,
    // List
    ListSource,
    ListSyncEngine,
    SyncConfig,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{CatalogApp, Collaborators};

// ============================================================================
// PUBLIC API - Integrations
// ============================================================================

pub use integrations::{
    AssistantBackend, CatalogBackend, OpenAiClient, OpenAiClientConfig, TmdbClient,
    TmdbClientConfig, TransportFailure,
};
