// src/repositories/session_store.rs

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::AppResult;

/// Persisted upstream session id
#[async_trait]
pub trait SessionStore: Send + Sync {
    fn observe_session_id(&self) -> watch::Receiver<Option<String>>;

    async fn save(&self, session_id: String) -> AppResult<()>;

    fn session_id(&self) -> Option<String> {
        self.observe_session_id().borrow().clone()
    }
}

pub struct InMemorySessionStore {
    session_id: watch::Sender<Option<String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { session_id: sender }
    }

    pub fn with_session(session_id: impl Into<String>) -> Self {
        let store = Self::new();
        store.session_id.send_replace(Some(session_id.into()));
        store
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn observe_session_id(&self) -> watch::Receiver<Option<String>> {
        self.session_id.subscribe()
    }

    async fn save(&self, session_id: String) -> AppResult<()> {
        self.session_id.send_replace(Some(session_id));
        Ok(())
    }
}
