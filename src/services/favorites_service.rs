// src/services/favorites_service.rs
//
// Single writer for favorite membership. A toggle is persisted first, then
// announced on the event bus so every engine patches its own copy of the
// item before the toggle returns.

use std::sync::Arc;

use log::debug;
use tokio::sync::{watch, Mutex};

use crate::domain::{FavoriteSet, ItemId};
use crate::error::AppResult;
use crate::events::{EventBus, FavoriteToggled};
use crate::repositories::FavoritesStore;

pub struct FavoritesService {
    store: Arc<dyn FavoritesStore>,
    event_bus: Arc<EventBus>,
    write_guard: Mutex<()>,
}

impl FavoritesService {
    pub fn new(store: Arc<dyn FavoritesStore>, event_bus: Arc<EventBus>) -> Self {
        Self {
            store,
            event_bus,
            write_guard: Mutex::new(()),
        }
    }

    /// Flip membership of `id`. Returns the new membership.
    pub async fn toggle(&self, id: ItemId) -> AppResult<bool> {
        let _guard = self.write_guard.lock().await;

        let now_favorite = !self.store.is_favorite(id);
        self.store.set_favorite(id, now_favorite).await?;
        debug!("Item {} favorite: {}", id, now_favorite);

        self.event_bus.emit(FavoriteToggled::new(id, now_favorite));
        Ok(now_favorite)
    }

    pub fn is_favorite(&self, id: ItemId) -> bool {
        self.store.is_favorite(id)
    }

    /// Read-only copy for a single merge
    pub fn snapshot(&self) -> FavoriteSet {
        self.store.snapshot()
    }

    pub fn observe(&self) -> watch::Receiver<FavoriteSet> {
        self.store.observe_all()
    }

    /// Live membership of a single item
    pub fn observe_favorite(&self, id: ItemId) -> watch::Receiver<bool> {
        self.store.observe_favorite(id)
    }
}
