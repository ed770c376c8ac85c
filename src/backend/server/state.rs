/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` is built once at startup and cloned into every handler. It
 * holds:
 * - the validated configuration
 * - the token service (read-only after construction)
 * - one store handle per resource, as trait objects over the same backend
 * - the image host and the mailer
 *
 * Every field is an `Arc`, so cloning the state is cheap and handlers
 * never need a lock of their own.
 *
 * # Example
 *
 * ```rust
 * use imagehub::backend::server::state::AppState;
 * use axum::extract::State;
 *
 * async fn handler(State(state): State<AppState>) {
 *     let port = state.config.server.port;
 *     # let _ = port;
 * }
 * ```
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::auth::sessions::TokenService;
use crate::backend::error::BackendError;
use crate::backend::mail::{Mailer, OutboxMailer};
use crate::backend::media::{ImageHost, MemoryImageHost};
use crate::backend::store::{CommentStore, MemoryStore, PhotoStore, TransformStore, UserStore};
use crate::shared::AppConfig;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn UserStore>,
    pub photos: Arc<dyn PhotoStore>,
    pub comments: Arc<dyn CommentStore>,
    pub transforms: Arc<dyn TransformStore>,
    pub images: Arc<dyn ImageHost>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// State backed by one store that implements every resource trait
    pub fn new<S>(
        config: AppConfig,
        store: S,
        images: Arc<dyn ImageHost>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, BackendError>
    where
        S: UserStore + PhotoStore + CommentStore + TransformStore + Clone + 'static,
    {
        let tokens = TokenService::new(&config.auth)?;
        Ok(Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            users: Arc::new(store.clone()),
            photos: Arc::new(store.clone()),
            comments: Arc::new(store.clone()),
            transforms: Arc::new(store),
            images,
            mailer,
        })
    }

    /// Fully in-process state: memory store, memory image host, outbox mailer
    pub fn in_memory(config: AppConfig) -> Result<Self, BackendError> {
        Self::new(
            config,
            MemoryStore::new(),
            Arc::new(MemoryImageHost::new()),
            Arc::new(OutboxMailer::new()),
        )
    }

    /// Base URL used in links sent by email
    pub fn public_url(&self) -> &str {
        self.config.server.public_url.trim_end_matches('/')
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl FromRef<AppState> for Arc<dyn UserStore> {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
