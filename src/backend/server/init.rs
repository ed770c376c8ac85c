/**
 * Server Initialization
 *
 * Builds the application from a validated `AppConfig`.
 *
 * # Initialization Process
 *
 * 1. Build the image host and the mailer
 * 2. Connect to PostgreSQL (or fall back to the in-memory store)
 * 3. Create the token service and the shared `AppState`
 * 4. Create and configure the router
 *
 * Any failure here is fatal: the binary exits instead of serving with a
 * half-configured state.
 */

use axum::Router;

use crate::backend::error::BackendError;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, load_image_host, load_mailer};
use crate::backend::server::state::AppState;
use crate::backend::store::MemoryStore;
use crate::shared::AppConfig;

/// Build the shared state from configuration
pub async fn create_state(config: AppConfig) -> Result<AppState, BackendError> {
    let images = load_image_host(&config)?;
    let mailer = load_mailer(&config)?;

    match load_database(&config).await? {
        Some(store) => AppState::new(config, store, images, mailer),
        None => AppState::new(config, MemoryStore::new(), images, mailer),
    }
}

/// Create and configure the Axum application
pub async fn create_app(config: AppConfig) -> Result<Router, BackendError> {
    tracing::info!("Initializing ImageHub backend server");
    let state = create_state(config).await?;
    let router = create_router(state);
    tracing::info!("Router configured");
    Ok(router)
}
