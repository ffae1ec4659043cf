// src/services/auth_sync_engine.rs
//
// Auth Sync Engine - request token, session exchange, list creation
//
// FLOW:
// Idle -> Loading -> TokenCreated(token) -> [user approves elsewhere]
//      -> Loading -> Authenticated
// Any Loading may end in Error(message).
//
// The flow and list creation each carry a generation. Every transition bumps
// it under the watch lock, and a request may only publish its result while
// its generation is still current.

use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info, warn};
use tokio::sync::watch;

use crate::domain::{AsyncActionState, AuthFlowState};
use crate::error::AppError;
use crate::events::{EventBus, ListCreated, SessionEstablished};
use crate::repositories::SessionStore;
use crate::services::CatalogGateway;

#[derive(Default)]
struct Generation(Mutex<u64>);

impl Generation {
    fn bump(&self) -> u64 {
        let mut generation = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        *generation
    }

    fn is_current(&self, generation: u64) -> bool {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) == generation
    }
}

struct AuthInner {
    gateway: Arc<CatalogGateway>,
    sessions: Arc<dyn SessionStore>,
    event_bus: Arc<EventBus>,
    flow: watch::Sender<AuthFlowState<String>>,
    flow_generation: Generation,
    create_list: watch::Sender<AsyncActionState<i64>>,
    create_list_generation: Generation,
}

impl AuthInner {
    /// Publish `next` unless a later transition has happened since
    /// `generation` was taken
    fn finish_flow(&self, generation: u64, next: AuthFlowState<String>) {
        let published = self.flow.send_if_modified(|state| {
            if !self.flow_generation.is_current(generation) {
                return false;
            }
            *state = next;
            true
        });
        if !published {
            debug!("Discarding superseded auth result");
        }
    }

    fn finish_create_list(&self, generation: u64, next: AsyncActionState<i64>) {
        let published = self.create_list.send_if_modified(|state| {
            if !self.create_list_generation.is_current(generation) {
                return false;
            }
            *state = next;
            true
        });
        if !published {
            debug!("Discarding superseded list creation result");
        }
    }
}

#[derive(Clone)]
pub struct AuthSyncEngine {
    inner: Arc<AuthInner>,
}

impl AuthSyncEngine {
    pub fn new(
        gateway: Arc<CatalogGateway>,
        sessions: Arc<dyn SessionStore>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            inner: Arc::new(AuthInner {
                gateway,
                sessions,
                event_bus,
                flow: watch::channel(AuthFlowState::Idle).0,
                flow_generation: Generation::default(),
                create_list: watch::channel(AsyncActionState::Idle).0,
                create_list_generation: Generation::default(),
            }),
        }
    }

    pub fn state(&self) -> watch::Receiver<AuthFlowState<String>> {
        self.inner.flow.subscribe()
    }

    pub fn current_state(&self) -> AuthFlowState<String> {
        self.inner.flow.borrow().clone()
    }

    pub fn create_list_state(&self) -> watch::Receiver<AsyncActionState<i64>> {
        self.inner.create_list.subscribe()
    }

    pub fn current_create_list_state(&self) -> AsyncActionState<i64> {
        self.inner.create_list.borrow().clone()
    }

    /// Ask the upstream for a request token. Restarts the flow from any
    /// state except Loading.
    pub async fn start_auth(&self) {
        let mut generation = None;
        self.inner.flow.send_if_modified(|state| {
            if matches!(state, AuthFlowState::Loading) {
                return false;
            }
            generation = Some(self.inner.flow_generation.bump());
            *state = AuthFlowState::Loading;
            true
        });
        let Some(generation) = generation else {
            debug!("start_auth ignored: a request is already running");
            return;
        };

        let next = match self.inner.gateway.create_auth_token().await {
            Ok(token) => {
                debug!("Request token created, waiting for approval");
                AuthFlowState::TokenCreated { token }
            }
            Err(error) => AuthFlowState::Error {
                message: error.to_string(),
            },
        };
        self.inner.finish_flow(generation, next);
    }

    /// Exchange the approved token for a session and persist it.
    /// Ignored unless a token was created.
    pub async fn complete_auth(&self, approved_token: &str) {
        let mut generation = None;
        self.inner.flow.send_if_modified(|state| {
            if !matches!(state, AuthFlowState::TokenCreated { .. }) {
                return false;
            }
            generation = Some(self.inner.flow_generation.bump());
            *state = AuthFlowState::Loading;
            true
        });
        let Some(generation) = generation else {
            warn!("complete_auth ignored: no request token has been created");
            return;
        };

        let next = match self.establish_session(approved_token).await {
            Ok(()) => AuthFlowState::Authenticated,
            Err(message) => AuthFlowState::Error { message },
        };
        self.inner.finish_flow(generation, next);
    }

    /// Move to Authenticated when a session was persisted earlier. A token
    /// request still running is superseded.
    pub fn check_authentication_status(&self) {
        if self.inner.sessions.session_id().is_some() {
            debug!("Persisted session found");
            self.inner.flow.send_modify(|state| {
                self.inner.flow_generation.bump();
                *state = AuthFlowState::Authenticated;
            });
        }
    }

    /// Only the latest call may publish its outcome
    pub async fn create_list(&self, name: &str, description: &str) {
        let mut generation = 0;
        self.inner.create_list.send_modify(|state| {
            generation = self.inner.create_list_generation.bump();
            *state = AsyncActionState::Loading;
        });

        let next = match self.create_list_with_session(name, description).await {
            Ok(list_id) => {
                self.inner
                    .event_bus
                    .emit(ListCreated::new(list_id, name.to_string()));
                AsyncActionState::Success { data: list_id }
            }
            Err(error) => AsyncActionState::Error { error },
        };
        self.inner.finish_create_list(generation, next);
    }

    /// Back to Idle; a creation still running will not publish
    pub fn reset_create_list(&self) {
        self.inner.create_list.send_modify(|state| {
            self.inner.create_list_generation.bump();
            *state = AsyncActionState::Idle;
        });
    }

    async fn establish_session(&self, approved_token: &str) -> Result<(), String> {
        let session_id = self
            .inner
            .gateway
            .create_session(approved_token)
            .await
            .map_err(|e| e.to_string())?;

        self.inner
            .sessions
            .save(session_id)
            .await
            .map_err(|e| e.to_string())?;

        info!("Session established");
        self.inner.event_bus.emit(SessionEstablished::new());
        Ok(())
    }

    async fn create_list_with_session(&self, name: &str, description: &str) -> Result<i64, String> {
        let session_id = self
            .inner
            .sessions
            .session_id()
            .ok_or_else(|| AppError::NoActiveSession.to_string())?;

        let list_id = self
            .inner
            .gateway
            .create_list(&session_id, name, description)
            .await
            .map_err(|e| e.to_string())?;

        info!("List {} created", list_id);
        Ok(list_id)
    }
}
