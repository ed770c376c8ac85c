//! Server Module
//!
//! This module contains the code that turns configuration into a running
//! Axum application.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs    - Module exports and documentation
//! ├── state.rs  - AppState and FromRef implementations
//! ├── config.rs - Store, image host and mailer construction
//! └── init.rs   - State and router creation
//! ```
//!
//! # State Management
//!
//! `AppState` is built once and cloned into every handler. It carries the
//! configuration, the token service, one store handle per resource, the
//! image host and the mailer, all behind `Arc`.
//!
//! # Example
//!
//! ```rust,no_run
//! use imagehub::backend::server::create_app;
//! use imagehub::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let app = create_app(config).await?;
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Collaborator construction
pub mod config;

/// Server initialization
pub mod init;

pub use init::{create_app, create_state};
pub use state::AppState;
