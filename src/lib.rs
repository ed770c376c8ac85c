//! ImageHub - Main Library
//!
//! ImageHub is a photo-sharing REST API: accounts with email confirmation
//! and JWT sessions, photo upload with tags and comments, saved image
//! transformations, and role-based access control. Image storage and
//! rendering are delegated to Cloudinary.
//!
//! # Module Structure
//!
//! - **`shared`** - Domain rules with no HTTP or storage dependency
//!   - Roles, field validation, tag and paging limits
//!   - Transformation parameters
//!   - Application configuration
//!
//! - **`backend`** - The Axum server
//!   - Token service, role policy and auth handlers
//!   - Photo, comment, user and transform handlers
//!   - PostgreSQL and in-memory stores
//!   - Cloudinary and SMTP clients
//!
//! # Usage
//!
//! ```rust,no_run
//! use imagehub::backend::server::init::create_app;
//! use imagehub::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let app = create_app(config).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::SharedError` for validation failures
//! - `shared::ConfigError` for configuration problems
//! - `backend::error::BackendError` for everything a handler can return;
//!   it renders as `{"error", "code", "status"}` JSON

/// Shared types and domain rules
pub mod shared;

/// Backend server-side code
pub mod backend;
