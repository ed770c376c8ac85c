//! Routes Module
//!
//! Route configuration for the HTTP API.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs        - Module exports
//! ├── router.rs     - Top-level router and layers
//! └── api_routes.rs - Per-resource routers and the health check
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use imagehub::backend::routes::create_router;
//! use imagehub::backend::server::state::AppState;
//! use imagehub::shared::AppConfig;
//!
//! # fn example(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let state = AppState::in_memory(config)?;
//! let app = create_router(state);
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

/// Top-level router
pub mod router;

/// Per-resource routes
pub mod api_routes;

pub use router::create_router;
