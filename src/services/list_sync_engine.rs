// src/services/list_sync_engine.rs
//
// List Sync Engine - paginated discover/search state
//
// CRITICAL RULES:
// - Bookkeeping lives in one snapshot, changed atomically per intent
// - Every fetch carries a generation; only the current one may commit
// - Resets (refresh, sort, filter, search) bump the generation, so an
//   in-flight fetch loses its right to commit
// - The snapshot lock is never held across an await
// - Favorites are merged from a fresh snapshot at commit time

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::{
    FavoritesMerger, FilterOptions, Item, ItemId, ListState, PageCursor, PageResult, SortOption,
};
use crate::error::{AppResult, CatalogError};
use crate::events::{EventBus, FavoriteToggled};
use crate::services::{CatalogGateway, FavoritesService};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Quiet period after the last keystroke before a search is issued
    pub search_debounce_ms: u64,
    /// Ordering of the discover page the favorites view is built from
    pub favorites_source_sort: SortOption,
}

impl SyncConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 500,
            favorites_source_sort: SortOption::PopularityDesc,
        }
    }
}

/// Where the list's items come from
#[derive(Debug, Clone, PartialEq)]
pub enum ListSource {
    Discover {
        sort: SortOption,
        filter: FilterOptions,
    },
    Search {
        query: String,
    },
}

#[derive(Debug, Clone)]
struct ListSnapshot {
    cursor: PageCursor,
    sort: SortOption,
    filter: FilterOptions,
    /// Text as last typed
    query: String,
    /// Query the list shows results for; None means discover mode
    active_search: Option<String>,
    /// Generation of the most recently issued fetch
    generation: u64,
    in_flight: bool,
    /// Bumped per keystroke; a debounce timer only fires with the latest one
    search_ticket: u64,
}

impl ListSnapshot {
    fn new() -> Self {
        Self {
            cursor: PageCursor::first(),
            sort: SortOption::default(),
            filter: FilterOptions::default(),
            query: String::new(),
            active_search: None,
            generation: 0,
            in_flight: false,
            search_ticket: 0,
        }
    }

    fn source(&self) -> ListSource {
        match &self.active_search {
            Some(query) => ListSource::Search {
                query: query.clone(),
            },
            None => ListSource::Discover {
                sort: self.sort,
                filter: self.filter.clone(),
            },
        }
    }

    /// Back to page 1. Whatever is in flight can no longer commit.
    fn reset(&mut self) {
        self.cursor = PageCursor::first();
        self.generation += 1;
        self.in_flight = false;
    }
}

/// A fetch that was allowed to start
#[derive(Debug)]
struct PendingFetch {
    generation: u64,
    page: u32,
    source: ListSource,
}

struct ListInner {
    gateway: Arc<CatalogGateway>,
    favorites: Arc<FavoritesService>,
    config: SyncConfig,
    snapshot: Mutex<ListSnapshot>,
    state: watch::Sender<ListState<Vec<Item>>>,
    favorites_view: watch::Sender<Vec<Item>>,
    /// Items the favorites view was last built from
    favorites_source: Mutex<Vec<Item>>,
    pending_search: Mutex<Option<JoinHandle<()>>>,
}

impl ListInner {
    fn lock_snapshot(&self) -> MutexGuard<'_, ListSnapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `update`, reset pagination and publish Loading, atomically.
    /// Returns false (and changes nothing) when `update` declines.
    fn reset_with(&self, update: impl FnOnce(&mut ListSnapshot) -> bool) -> bool {
        let mut snapshot = self.lock_snapshot();
        if !update(&mut snapshot) {
            return false;
        }
        snapshot.reset();
        self.state.send_replace(ListState::Loading);
        true
    }

    fn begin_fetch(&self) -> Option<PendingFetch> {
        let mut snapshot = self.lock_snapshot();
        if snapshot.in_flight {
            debug!("load_more ignored: a fetch is already in flight");
            return None;
        }
        if snapshot.cursor.is_last_page {
            debug!("load_more ignored: last page reached");
            return None;
        }

        snapshot.generation += 1;
        snapshot.in_flight = true;

        // recovering from an error starts over from a clean list
        self.state.send_if_modified(|state| {
            if matches!(state, ListState::Error { .. }) {
                *state = ListState::Loading;
                true
            } else {
                false
            }
        });

        Some(PendingFetch {
            generation: snapshot.generation,
            page: snapshot.cursor.page,
            source: snapshot.source(),
        })
    }

    async fn run_fetch(&self, fetch: &PendingFetch) -> Result<PageResult, CatalogError> {
        match &fetch.source {
            ListSource::Discover { sort, filter } => {
                self.gateway.discover(fetch.page, *sort, filter).await
            }
            ListSource::Search { query } => self.gateway.search(query, fetch.page).await,
        }
    }

    fn commit(&self, fetch: PendingFetch, result: Result<PageResult, CatalogError>) {
        let mut snapshot = self.lock_snapshot();
        if snapshot.generation != fetch.generation {
            debug!(
                "Discarding superseded result for page {} (generation {}, current {})",
                fetch.page, fetch.generation, snapshot.generation
            );
            return;
        }
        snapshot.in_flight = false;

        match result {
            Ok(page) => {
                let cursor = PageCursor::advanced(fetch.page, page.total_pages);
                snapshot.cursor = cursor;

                // Membership is read under the state lock, so a toggle either
                // lands before the read or patches the published items after.
                self.state.send_modify(|state| {
                    let merged = FavoritesMerger::merge(&page.items, &self.favorites.snapshot());
                    let mut data = match std::mem::replace(state, ListState::Loading) {
                        ListState::Success { data, .. } if fetch.page > 1 => data,
                        _ => Vec::new(),
                    };
                    data.extend(merged);
                    *state = ListState::Success {
                        data,
                        is_last_page: cursor.is_last_page,
                    };
                });
            }
            Err(error) => {
                debug!("Fetch of page {} failed: {}", fetch.page, error);
                // items are dropped with the error, so the next attempt starts at page 1
                snapshot.cursor = PageCursor::first();
                self.state.send_replace(ListState::Error { error });
            }
        }
    }

    fn apply_favorite(&self, id: ItemId, is_favorite: bool) {
        self.state.send_if_modified(|state| match state {
            ListState::Success { data, .. } => {
                let mut changed = false;
                for item in data.iter_mut().filter(|item| item.id == id) {
                    if item.is_favorite != is_favorite {
                        *item = item.with_favorite(is_favorite);
                        changed = true;
                    }
                }
                changed
            }
            _ => false,
        });
        self.rebuild_favorites_view();
    }

    fn rebuild_favorites_view(&self) {
        let source = self
            .favorites_source
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.favorites_view.send_modify(|view| {
            *view = FavoritesMerger::filter_favorites(&source, &self.favorites.snapshot());
        });
    }

    fn cancel_pending_search(&self) {
        let mut pending = self
            .pending_search
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

/// Owner of the catalog list: pagination, sort, filter, debounced search
/// and the favorites view.
///
/// Clones are handles to the same engine.
#[derive(Clone)]
pub struct ListSyncEngine {
    inner: Arc<ListInner>,
}

impl ListSyncEngine {
    pub fn new(
        gateway: Arc<CatalogGateway>,
        favorites: Arc<FavoritesService>,
        event_bus: &EventBus,
        config: SyncConfig,
    ) -> Self {
        let inner = Arc::new(ListInner {
            gateway,
            favorites,
            config,
            snapshot: Mutex::new(ListSnapshot::new()),
            state: watch::channel(ListState::Loading).0,
            favorites_view: watch::channel(Vec::new()).0,
            favorites_source: Mutex::new(Vec::new()),
            pending_search: Mutex::new(None),
        });

        let weak = Arc::downgrade(&inner);
        event_bus.subscribe::<FavoriteToggled, _>(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.apply_favorite(event.item_id, event.is_favorite);
            }
        });

        Self { inner }
    }

    // ========================================================================
    // OBSERVATION
    // ========================================================================

    pub fn state(&self) -> watch::Receiver<ListState<Vec<Item>>> {
        self.inner.state.subscribe()
    }

    pub fn current_state(&self) -> ListState<Vec<Item>> {
        self.inner.state.borrow().clone()
    }

    pub fn favorites(&self) -> watch::Receiver<Vec<Item>> {
        self.inner.favorites_view.subscribe()
    }

    pub fn page_cursor(&self) -> PageCursor {
        self.inner.lock_snapshot().cursor
    }

    pub fn sort(&self) -> SortOption {
        self.inner.lock_snapshot().sort
    }

    pub fn filter(&self) -> FilterOptions {
        self.inner.lock_snapshot().filter.clone()
    }

    /// Text as last typed, which may not have been searched yet
    pub fn search_query(&self) -> String {
        self.inner.lock_snapshot().query.clone()
    }

    pub fn source(&self) -> ListSource {
        self.inner.lock_snapshot().source()
    }

    pub fn is_favorite(&self, id: ItemId) -> bool {
        self.inner.favorites.is_favorite(id)
    }

    // ========================================================================
    // INTENTS
    // ========================================================================

    /// Fetch the next page. No-op while a fetch is in flight or once the
    /// last page was reached.
    pub async fn load_more(&self) {
        let Some(fetch) = self.inner.begin_fetch() else {
            return;
        };
        let result = self.inner.run_fetch(&fetch).await;
        self.inner.commit(fetch, result);
    }

    pub async fn refresh(&self) {
        self.inner.reset_with(|_| true);
        self.load_more().await;
    }

    pub async fn set_sort(&self, sort: SortOption) {
        let changed = self.inner.reset_with(|snapshot| {
            if snapshot.sort == sort {
                return false;
            }
            snapshot.sort = sort;
            true
        });

        if changed {
            self.load_more().await;
        }
    }

    pub async fn set_filter(&self, filter: FilterOptions) {
        self.inner.reset_with(|snapshot| {
            snapshot.filter = filter;
            true
        });
        self.load_more().await;
    }

    /// Record a keystroke. Non-blank text is searched once typing pauses for
    /// the configured debounce; clearing the text returns to discover mode
    /// right away.
    pub async fn set_search_query(&self, query: impl Into<String>) {
        let query = query.into();
        let (previous, ticket) = {
            let mut snapshot = self.inner.lock_snapshot();
            let previous = std::mem::replace(&mut snapshot.query, query.clone());
            snapshot.search_ticket += 1;
            (previous, snapshot.search_ticket)
        };

        self.inner.cancel_pending_search();

        if !query.trim().is_empty() {
            self.schedule_search(query, ticket);
        } else if !previous.trim().is_empty() {
            self.inner.reset_with(|snapshot| {
                snapshot.active_search = None;
                true
            });
            self.load_more().await;
        }
    }

    /// Flip favorite membership of `item`. The new flag is visible in this
    /// engine's state (and every other engine's) when this returns. No
    /// request is made; the favorites view is recomputed from its last source.
    pub async fn toggle_favorite(&self, item: &Item) -> AppResult<bool> {
        self.inner.favorites.toggle(item.id).await
    }

    /// Refetch the favorites view source. Upstream failures leave it empty.
    pub async fn refresh_favorites(&self) {
        let result = self
            .inner
            .gateway
            .discover(
                1,
                self.inner.config.favorites_source_sort,
                &FilterOptions::default(),
            )
            .await;

        let source = match result {
            Ok(page) => page.items,
            Err(error) => {
                debug!("Favorites view unavailable ({}), showing none", error);
                Vec::new()
            }
        };
        *self
            .inner
            .favorites_source
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = source;
        self.inner.rebuild_favorites_view();
    }

    // ========================================================================
    // INTERNAL: Debounced search
    // ========================================================================

    fn schedule_search(&self, query: String, ticket: u64) {
        let engine = self.clone();
        let delay = self.inner.config.search_debounce();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            engine.start_search(query, ticket);
        });

        let mut pending = self
            .inner
            .pending_search
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *pending = Some(handle);
    }

    /// Timer elapsed. The fetch runs detached so that aborting a later timer
    /// never cancels it halfway; superseding goes through the generation.
    fn start_search(&self, query: String, ticket: u64) {
        let started = self.inner.reset_with(|snapshot| {
            if snapshot.search_ticket != ticket {
                return false;
            }
            snapshot.active_search = Some(query.clone());
            true
        });

        if !started {
            debug!("Search for {:?} superseded before it started", query);
            return;
        }

        debug!("Searching for {:?}", query);
        let engine = self.clone();
        tokio::spawn(async move {
            engine.load_more().await;
        });
    }
}
