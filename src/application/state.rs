// src/application/state.rs
//
// Composition root. Wires the gateway, favorites service and engines over
// the collaborators the host provides.

use std::sync::Arc;

use log::info;

use crate::error::AppResult;
use crate::events::{create_event_bus, EventBus};
use crate::integrations::{
    AssistantBackend, CatalogBackend, OpenAiClient, OpenAiClientConfig, TmdbClient,
    TmdbClientConfig,
};
use crate::repositories::{FavoritesStore, KeyConfigStore, SessionStore};
use crate::services::{
    AssistantSyncEngine, AuthSyncEngine, CatalogGateway, DetailSyncEngine, FavoritesService,
    ListSyncEngine, SyncConfig,
};

/// Everything the engines need from the outside world
pub struct Collaborators {
    pub catalog_backend: Arc<dyn CatalogBackend>,
    pub assistant_backend: Arc<dyn AssistantBackend>,
    pub key_config: Arc<dyn KeyConfigStore>,
    pub favorites_store: Arc<dyn FavoritesStore>,
    pub session_store: Arc<dyn SessionStore>,
}

/// Application state handed to the presentation layer.
/// All fields are Arc-wrapped or cheap handles for sharing across tasks.
pub struct CatalogApp {
    pub event_bus: Arc<EventBus>,
    pub gateway: Arc<CatalogGateway>,
    pub favorites: Arc<FavoritesService>,
    pub list: ListSyncEngine,
    pub detail: DetailSyncEngine,
    pub auth: AuthSyncEngine,
    pub assistant: AssistantSyncEngine,
}

impl CatalogApp {
    pub fn new(collaborators: Collaborators, config: SyncConfig) -> Self {
        // 1. INFRASTRUCTURE
        let event_bus = Arc::new(create_event_bus());

        // 2. SERVICES
        let gateway = Arc::new(CatalogGateway::new(
            collaborators.catalog_backend,
            collaborators.assistant_backend,
            collaborators.key_config,
        ));
        let favorites = Arc::new(FavoritesService::new(
            collaborators.favorites_store,
            Arc::clone(&event_bus),
        ));

        // 3. ENGINES (subscribe to the bus on construction)
        let list = ListSyncEngine::new(
            Arc::clone(&gateway),
            Arc::clone(&favorites),
            &event_bus,
            config,
        );
        let detail = DetailSyncEngine::new(Arc::clone(&gateway), Arc::clone(&favorites), &event_bus);
        let auth = AuthSyncEngine::new(
            Arc::clone(&gateway),
            collaborators.session_store,
            Arc::clone(&event_bus),
        );
        let assistant = AssistantSyncEngine::new(Arc::clone(&gateway));

        Self {
            event_bus,
            gateway,
            favorites,
            list,
            detail,
            auth,
            assistant,
        }
    }

    /// Wire the reqwest transports around host-provided stores
    pub fn with_http_clients(
        tmdb: TmdbClientConfig,
        openai: OpenAiClientConfig,
        key_config: Arc<dyn KeyConfigStore>,
        favorites_store: Arc<dyn FavoritesStore>,
        session_store: Arc<dyn SessionStore>,
        config: SyncConfig,
    ) -> AppResult<Self> {
        let collaborators = Collaborators {
            catalog_backend: Arc::new(TmdbClient::new(tmdb)?),
            assistant_backend: Arc::new(OpenAiClient::new(openai)?),
            key_config,
            favorites_store,
            session_store,
        };
        Ok(Self::new(collaborators, config))
    }

    /// First load: catalog page 1, the favorites view and the persisted
    /// session.
    pub async fn start(&self) {
        self.auth.check_authentication_status();
        tokio::join!(self.list.refresh(), self.list.refresh_favorites());
        info!("Catalog ready");
    }
}
