// src/repositories/key_config_store.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Which upstream an API key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyKind {
    Catalog,
    Assistant,
}

/// Configured API keys. A blank string means "not configured".
pub trait KeyConfigStore: Send + Sync {
    fn observe_api_key(&self, kind: ApiKeyKind) -> watch::Receiver<String>;

    fn api_key(&self, kind: ApiKeyKind) -> String {
        self.observe_api_key(kind).borrow().clone()
    }

    fn is_configured(&self, kind: ApiKeyKind) -> bool {
        !self.observe_api_key(kind).borrow().trim().is_empty()
    }
}

pub struct InMemoryKeyConfigStore {
    keys: HashMap<ApiKeyKind, watch::Sender<String>>,
}

impl InMemoryKeyConfigStore {
    pub fn new() -> Self {
        let keys = [ApiKeyKind::Catalog, ApiKeyKind::Assistant]
            .into_iter()
            .map(|kind| (kind, watch::channel(String::new()).0))
            .collect();
        Self { keys }
    }

    pub fn with_keys(catalog: impl Into<String>, assistant: impl Into<String>) -> Self {
        let store = Self::new();
        store.set_api_key(ApiKeyKind::Catalog, catalog);
        store.set_api_key(ApiKeyKind::Assistant, assistant);
        store
    }

    pub fn set_api_key(&self, kind: ApiKeyKind, key: impl Into<String>) {
        if let Some(sender) = self.keys.get(&kind) {
            sender.send_replace(key.into());
        }
    }
}

impl Default for InMemoryKeyConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyConfigStore for InMemoryKeyConfigStore {
    fn observe_api_key(&self, kind: ApiKeyKind) -> watch::Receiver<String> {
        match self.keys.get(&kind) {
            Some(sender) => sender.subscribe(),
            // every kind is seeded in new(); keep the contract total anyway
            None => watch::channel(String::new()).1,
        }
    }
}
