// src/services/test_support.rs
//
// Shared fixtures for engine tests: a scripted backend whose calls can be
// held open or failed by call index, and a harness wiring the collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, Notify};

use crate::domain::{DiscoverQuery, FavoriteSet, Item, ItemId, PageResult, SortOption};
use crate::error::AppResult;
use crate::events::EventBus;
use crate::integrations::{
    AssistantBackend, CatalogBackend, CreateListResponse, SessionResponse, TokenResponse,
    TransportFailure,
};
use crate::repositories::{
    FavoritesStore, InMemoryFavoritesStore, InMemoryKeyConfigStore, InMemorySessionStore,
    SessionStore,
};
use crate::services::{
    AssistantSyncEngine, AuthSyncEngine, CatalogGateway, DetailSyncEngine, FavoritesService,
    ListSyncEngine, SyncConfig,
};

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Discover {
        page: u32,
        sort: Option<SortOption>,
        genres: Option<String>,
    },
    Search {
        query: String,
        page: u32,
    },
    Detail(ItemId),
    CreateToken,
    CreateSession(String),
    CreateList {
        session_id: String,
        name: String,
    },
    Ask(String),
}

#[derive(Default)]
struct Script {
    calls: Vec<BackendCall>,
    holds: HashMap<usize, Arc<Notify>>,
    failures: HashMap<usize, TransportFailure>,
}

/// Backend answering every call from a fixed catalog.
///
/// Page items get id `page * 1000 + i` and a title naming the call index,
/// so tests can tell which request produced what they see.
pub struct ScriptedBackend {
    page_size: usize,
    total_pages: u32,
    script: Mutex<Script>,
}

impl ScriptedBackend {
    pub fn new(page_size: usize, total_pages: u32) -> Self {
        Self {
            page_size,
            total_pages,
            script: Mutex::new(Script::default()),
        }
    }

    /// Call `index` (0-based, across all operations) blocks until the
    /// returned gate is notified.
    pub fn hold_call(&self, index: usize) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.script
            .lock()
            .unwrap()
            .holds
            .insert(index, Arc::clone(&gate));
        gate
    }

    pub fn fail_call(&self, index: usize, failure: TransportFailure) {
        self.script.lock().unwrap().failures.insert(index, failure);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script.lock().unwrap().calls.len()
    }

    /// Yield until at least `count` calls were recorded
    pub async fn wait_for_calls(&self, count: usize) {
        for _ in 0..1000 {
            if self.call_count() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!(
            "expected {} backend calls, saw {:?}",
            count,
            self.calls()
        );
    }

    async fn record(&self, call: BackendCall) -> Result<usize, TransportFailure> {
        let (index, hold, failure) = {
            let mut script = self.script.lock().unwrap();
            let index = script.calls.len();
            script.calls.push(call);
            (
                index,
                script.holds.get(&index).cloned(),
                script.failures.remove(&index),
            )
        };

        if let Some(gate) = hold {
            gate.notified().await;
        }

        match failure {
            Some(failure) => Err(failure),
            None => Ok(index),
        }
    }

    fn page(&self, index: usize, page: u32) -> PageResult {
        let items = (0..self.page_size)
            .map(|i| {
                Item::new(
                    page as ItemId * 1000 + i as ItemId,
                    format!("call{} p{} #{}", index, page, i),
                )
            })
            .collect();
        PageResult {
            items,
            total_pages: self.total_pages,
        }
    }
}

#[async_trait]
impl CatalogBackend for ScriptedBackend {
    async fn discover(
        &self,
        _api_key: &str,
        query: &DiscoverQuery,
    ) -> Result<PageResult, TransportFailure> {
        let index = self
            .record(BackendCall::Discover {
                page: query.page,
                sort: query.sort,
                genres: query.genres_param(),
            })
            .await?;
        Ok(self.page(index, query.page))
    }

    async fn search(
        &self,
        _api_key: &str,
        query: &str,
        page: u32,
    ) -> Result<PageResult, TransportFailure> {
        let index = self
            .record(BackendCall::Search {
                query: query.to_string(),
                page,
            })
            .await?;
        Ok(self.page(index, page))
    }

    async fn get_detail(&self, id: ItemId, _api_key: &str) -> Result<Item, TransportFailure> {
        self.record(BackendCall::Detail(id)).await?;
        Ok(Item::new(id, format!("Movie {}", id)))
    }

    async fn create_token(&self, _api_key: &str) -> Result<TokenResponse, TransportFailure> {
        self.record(BackendCall::CreateToken).await?;
        Ok(TokenResponse {
            success: true,
            request_token: "request-token".to_string(),
        })
    }

    async fn create_session(
        &self,
        _api_key: &str,
        approved_token: &str,
    ) -> Result<SessionResponse, TransportFailure> {
        self.record(BackendCall::CreateSession(approved_token.to_string()))
            .await?;
        Ok(SessionResponse {
            success: true,
            session_id: "session-1".to_string(),
        })
    }

    async fn create_list(
        &self,
        _api_key: &str,
        session_id: &str,
        name: &str,
        _description: &str,
    ) -> Result<CreateListResponse, TransportFailure> {
        self.record(BackendCall::CreateList {
            session_id: session_id.to_string(),
            name: name.to_string(),
        })
        .await?;
        Ok(CreateListResponse {
            success: true,
            list_id: 42,
            status_message: "The item/record was created successfully.".to_string(),
        })
    }
}

#[async_trait]
impl AssistantBackend for ScriptedBackend {
    async fn ask(&self, _api_key: &str, prompt: &str) -> Result<String, TransportFailure> {
        let index = self.record(BackendCall::Ask(prompt.to_string())).await?;
        Ok(format!("answer{}", index))
    }
}

/// Favorites store whose first snapshot is read and then returned only after
/// `delay`, blocking the calling thread like a slow disk read would.
pub struct SlowSnapshotStore {
    inner: InMemoryFavoritesStore,
    delay: Duration,
    reading: AtomicBool,
}

impl SlowSnapshotStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: InMemoryFavoritesStore::new(),
            delay,
            reading: AtomicBool::new(false),
        }
    }

    /// Resolves once the slow snapshot has taken its copy
    pub async fn wait_until_reading(&self) {
        while !self.reading.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

#[async_trait]
impl FavoritesStore for SlowSnapshotStore {
    fn observe_all(&self) -> watch::Receiver<FavoriteSet> {
        self.inner.observe_all()
    }

    async fn set_favorite(&self, id: ItemId, favorite: bool) -> AppResult<()> {
        self.inner.set_favorite(id, favorite).await
    }

    fn snapshot(&self) -> FavoriteSet {
        let copy = self.inner.snapshot();
        if !self.reading.swap(true, Ordering::SeqCst) {
            std::thread::sleep(self.delay);
        }
        copy
    }
}

/// Collaborators shared by every engine under test
pub struct Harness {
    pub backend: Arc<ScriptedBackend>,
    pub keys: Arc<InMemoryKeyConfigStore>,
    pub favorites_store: Arc<dyn FavoritesStore>,
    pub sessions: Arc<InMemorySessionStore>,
    pub event_bus: Arc<EventBus>,
    pub gateway: Arc<CatalogGateway>,
    pub favorites: Arc<FavoritesService>,
}

impl Harness {
    pub fn new(page_size: usize, total_pages: u32) -> Self {
        Self::with_favorites(page_size, total_pages, HashSet::new())
    }

    pub fn with_favorites(page_size: usize, total_pages: u32, favorites: HashSet<ItemId>) -> Self {
        Self::with_store(
            page_size,
            total_pages,
            Arc::new(InMemoryFavoritesStore::with_favorites(favorites)),
        )
    }

    pub fn with_store(
        page_size: usize,
        total_pages: u32,
        favorites_store: Arc<dyn FavoritesStore>,
    ) -> Self {
        let backend = Arc::new(ScriptedBackend::new(page_size, total_pages));
        let keys = Arc::new(InMemoryKeyConfigStore::with_keys("tmdb-key", "openai-key"));
        let sessions = Arc::new(InMemorySessionStore::new());
        let event_bus = Arc::new(EventBus::new());

        let gateway = Arc::new(CatalogGateway::new(
            Arc::clone(&backend) as Arc<dyn CatalogBackend>,
            Arc::clone(&backend) as Arc<dyn AssistantBackend>,
            keys.clone(),
        ));
        let favorites = Arc::new(FavoritesService::new(
            Arc::clone(&favorites_store),
            Arc::clone(&event_bus),
        ));

        Self {
            backend,
            keys,
            favorites_store,
            sessions,
            event_bus,
            gateway,
            favorites,
        }
    }

    pub fn list_engine(&self) -> ListSyncEngine {
        self.list_engine_with(SyncConfig::default())
    }

    pub fn list_engine_with(&self, config: SyncConfig) -> ListSyncEngine {
        ListSyncEngine::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.favorites),
            &self.event_bus,
            config,
        )
    }

    pub fn detail_engine(&self) -> DetailSyncEngine {
        DetailSyncEngine::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.favorites),
            &self.event_bus,
        )
    }

    pub fn auth_engine(&self) -> AuthSyncEngine {
        AuthSyncEngine::new(
            Arc::clone(&self.gateway),
            self.sessions.clone() as Arc<dyn SessionStore>,
            Arc::clone(&self.event_bus),
        )
    }

    pub fn assistant_engine(&self) -> AssistantSyncEngine {
        AssistantSyncEngine::new(Arc::clone(&self.gateway))
    }
}
