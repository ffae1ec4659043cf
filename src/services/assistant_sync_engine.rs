// src/services/assistant_sync_engine.rs
//
// Free-text answers about catalog items from the assistant backend.

use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use tokio::sync::watch;

use crate::domain::{AsyncActionState, Item};
use crate::error::CatalogError;
use crate::services::CatalogGateway;

pub type AssistantState = AsyncActionState<String, CatalogError>;

/// Prompt asking for a short description of `item`
pub fn item_prompt(item: &Item) -> String {
    format!(
        "Tell me about the movie '{}' in a brief paragraph.",
        item.title
    )
}

struct AssistantInner {
    gateway: Arc<CatalogGateway>,
    generation: Mutex<u64>,
    state: watch::Sender<AssistantState>,
}

impl AssistantInner {
    fn bump(&self) -> u64 {
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        *generation
    }

    fn is_current(&self, generation: u64) -> bool {
        *self.generation.lock().unwrap_or_else(PoisonError::into_inner) == generation
    }
}

#[derive(Clone)]
pub struct AssistantSyncEngine {
    inner: Arc<AssistantInner>,
}

impl AssistantSyncEngine {
    pub fn new(gateway: Arc<CatalogGateway>) -> Self {
        Self {
            inner: Arc::new(AssistantInner {
                gateway,
                generation: Mutex::new(0),
                state: watch::channel(AsyncActionState::Idle).0,
            }),
        }
    }

    pub fn state(&self) -> watch::Receiver<AssistantState> {
        self.inner.state.subscribe()
    }

    pub fn current_state(&self) -> AssistantState {
        self.inner.state.borrow().clone()
    }

    pub async fn ask_about_item(&self, item: &Item) {
        self.ask(&item_prompt(item)).await;
    }

    /// Only the latest question may publish its answer
    pub async fn ask(&self, prompt: &str) {
        let generation = self.inner.bump();
        self.inner.state.send_replace(AsyncActionState::Loading);

        let result = self.inner.gateway.ask_assistant(prompt).await;
        if !self.inner.is_current(generation) {
            debug!("Discarding superseded assistant answer");
            return;
        }

        let next = match result {
            Ok(answer) => AsyncActionState::Success { data: answer },
            Err(error) => AsyncActionState::Error { error },
        };
        self.inner.state.send_replace(next);
    }

    /// Drop the current answer; a question still running will not publish
    pub fn clear_response(&self) {
        self.inner.bump();
        self.inner.state.send_replace(AsyncActionState::Idle);
    }
}
