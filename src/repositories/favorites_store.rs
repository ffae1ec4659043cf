// src/repositories/favorites_store.rs

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::{FavoriteSet, ItemId};
use crate::error::AppResult;

/// Durable set of favorited item ids
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Live view of the whole set
    fn observe_all(&self) -> watch::Receiver<FavoriteSet>;

    async fn set_favorite(&self, id: ItemId, favorite: bool) -> AppResult<()>;

    /// Snapshot of the current set
    fn snapshot(&self) -> FavoriteSet {
        self.observe_all().borrow().clone()
    }

    fn is_favorite(&self, id: ItemId) -> bool {
        self.observe_all().borrow().contains(&id)
    }

    /// Live membership of one id, derived from `observe_all`.
    ///
    /// Spawns a forwarding task, so it must be called inside a tokio
    /// runtime. The task ends when the receiver or the store goes away.
    fn observe_favorite(&self, id: ItemId) -> watch::Receiver<bool> {
        let mut all = self.observe_all();
        let (sender, receiver) = watch::channel(all.borrow_and_update().contains(&id));

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = all.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let now = all.borrow_and_update().contains(&id);
                        sender.send_if_modified(|current| {
                            if *current == now {
                                return false;
                            }
                            *current = now;
                            true
                        });
                    }
                    _ = sender.closed() => break,
                }
            }
        });

        receiver
    }
}

pub struct InMemoryFavoritesStore {
    favorites: watch::Sender<FavoriteSet>,
}

impl InMemoryFavoritesStore {
    pub fn new() -> Self {
        Self::with_favorites(FavoriteSet::new())
    }

    pub fn with_favorites(favorites: FavoriteSet) -> Self {
        let (sender, _) = watch::channel(favorites);
        Self { favorites: sender }
    }
}

impl Default for InMemoryFavoritesStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FavoritesStore for InMemoryFavoritesStore {
    fn observe_all(&self) -> watch::Receiver<FavoriteSet> {
        self.favorites.subscribe()
    }

    async fn set_favorite(&self, id: ItemId, favorite: bool) -> AppResult<()> {
        self.favorites.send_if_modified(|set| {
            if favorite {
                set.insert(id)
            } else {
                set.remove(&id)
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_clear_favorite() {
        let store = InMemoryFavoritesStore::new();
        assert!(!store.is_favorite(550));

        store.set_favorite(550, true).await.unwrap();
        assert!(store.is_favorite(550));

        store.set_favorite(550, false).await.unwrap();
        assert!(!store.is_favorite(550));
    }

    #[tokio::test]
    async fn test_observers_see_changes() {
        let store = InMemoryFavoritesStore::new();
        let mut receiver = store.observe_all();

        store.set_favorite(13, true).await.unwrap();

        receiver.changed().await.unwrap();
        assert!(receiver.borrow_and_update().contains(&13));
    }

    #[tokio::test]
    async fn test_observe_favorite_follows_one_id() {
        let store = InMemoryFavoritesStore::with_favorites([1].into_iter().collect());
        let mut first = store.observe_favorite(1);
        let mut second = store.observe_favorite(2);
        assert!(*first.borrow_and_update());
        assert!(!*second.borrow_and_update());

        store.set_favorite(2, true).await.unwrap();
        second.changed().await.unwrap();
        assert!(*second.borrow_and_update());

        store.set_favorite(1, false).await.unwrap();
        first.changed().await.unwrap();
        assert!(!*first.borrow_and_update());

        // changes to other ids are not forwarded
        store.set_favorite(3, true).await.unwrap();
        tokio::task::yield_now().await;
        assert!(!second.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_redundant_write_does_not_notify() {
        let store = InMemoryFavoritesStore::with_favorites([1].into_iter().collect());
        let receiver = store.observe_all();

        store.set_favorite(1, true).await.unwrap();

        assert!(!receiver.has_changed().unwrap());
    }
}
