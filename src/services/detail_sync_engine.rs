// src/services/detail_sync_engine.rs
//
// Detail Sync Engine - one item at a time
//
// Only the most recent load_detail may publish; an older one finishing
// late is dropped. Favorite toggles from anywhere patch the shown item.

use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use tokio::sync::watch;

use crate::domain::{DetailState, FavoritesMerger, Item, ItemId};
use crate::error::AppResult;
use crate::events::{EventBus, FavoriteToggled};
use crate::services::{CatalogGateway, FavoritesService};

struct DetailInner {
    gateway: Arc<CatalogGateway>,
    favorites: Arc<FavoritesService>,
    generation: Mutex<u64>,
    state: watch::Sender<DetailState<Item>>,
}

impl DetailInner {
    fn next_generation(&self) -> u64 {
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        *generation
    }

    fn apply_favorite(&self, id: ItemId, is_favorite: bool) {
        self.state.send_if_modified(|state| match state {
            DetailState::Success { data } if data.id == id && data.is_favorite != is_favorite => {
                *data = data.with_favorite(is_favorite);
                true
            }
            _ => false,
        });
    }
}

#[derive(Clone)]
pub struct DetailSyncEngine {
    inner: Arc<DetailInner>,
}

impl DetailSyncEngine {
    pub fn new(
        gateway: Arc<CatalogGateway>,
        favorites: Arc<FavoritesService>,
        event_bus: &EventBus,
    ) -> Self {
        let inner = Arc::new(DetailInner {
            gateway,
            favorites,
            generation: Mutex::new(0),
            state: watch::channel(DetailState::Loading).0,
        });

        let weak = Arc::downgrade(&inner);
        event_bus.subscribe::<FavoriteToggled, _>(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.apply_favorite(event.item_id, event.is_favorite);
            }
        });

        Self { inner }
    }

    pub fn state(&self) -> watch::Receiver<DetailState<Item>> {
        self.inner.state.subscribe()
    }

    pub fn current_state(&self) -> DetailState<Item> {
        self.inner.state.borrow().clone()
    }

    pub async fn load_detail(&self, id: ItemId) {
        let generation = self.inner.next_generation();
        self.inner.state.send_replace(DetailState::Loading);

        let result = self.inner.gateway.fetch_detail(id).await;

        let current = *self
            .inner
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if current != generation {
            debug!("Discarding superseded detail for item {}", id);
            return;
        }

        // merged under the state lock so a concurrent toggle cannot be lost
        self.inner.state.send_modify(|state| {
            *state = match result {
                Ok(item) => DetailState::Success {
                    data: FavoritesMerger::merge_one(&item, &self.inner.favorites.snapshot()),
                },
                Err(error) => DetailState::Error { error, item_id: id },
            };
        });
    }

    /// Reload the item that failed. Does nothing unless the state is Error.
    pub async fn retry(&self) {
        let failed_id = match &*self.inner.state.borrow() {
            DetailState::Error { item_id, .. } => Some(*item_id),
            _ => None,
        };

        match failed_id {
            Some(id) => self.load_detail(id).await,
            None => debug!("retry ignored: detail is not in an error state"),
        }
    }

    pub async fn toggle_favorite(&self, item: &Item) -> AppResult<bool> {
        self.inner.favorites.toggle(item.id).await
    }
}
