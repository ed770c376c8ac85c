//! Backend Module
//!
//! This module contains all server-side code for ImageHub: an Axum HTTP
//! server over a PostgreSQL (or in-memory) store, with Cloudinary for
//! image hosting and SMTP for account email.
//!
//! # Architecture
//!
//! - **`server`** - State construction and application setup
//! - **`routes`** - Route configuration and router assembly
//! - **`auth`** - Token service, password hashing, role policy, auth handlers
//! - **`middleware`** - Bearer-token authentication
//! - **`photos`**, **`comments`**, **`users`**, **`transforms`** - resource handlers
//! - **`store`** - Store traits with PostgreSQL and in-memory implementations
//! - **`media`** - Image host trait, Cloudinary client, multipart forms
//! - **`mail`** - Mailer trait, SMTP transport, recording outbox
//! - **`error`** - `BackendError` and its HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs       - Module exports and documentation
//! ├── main.rs      - Server binary
//! ├── server/      - State and initialization
//! ├── routes/      - Route configuration
//! ├── auth/        - Authentication and authorization
//! ├── middleware/  - Request middleware
//! ├── photos/      - /api/images
//! ├── comments/    - /api/comments
//! ├── users/       - /api/users
//! ├── transforms/  - /api/transform
//! ├── store/       - Persistence
//! ├── media/       - Image hosting
//! ├── mail/        - Outgoing mail
//! └── error/       - Error types
//! ```
//!
//! # Request Flow
//!
//! 1. `TraceLayer` opens a span for the request
//! 2. Protected routes run `auth_middleware`, which verifies the access
//!    token and loads the caller with their current role
//! 3. The handler loads the addressed resource (404 if missing) and calls
//!    the matching `Policy` (403 if denied)
//! 4. The store performs the change; errors convert into `BackendError`

/// Server initialization and state
pub mod server;

/// Route configuration
pub mod routes;

/// Authentication and authorization
pub mod auth;

/// Request middleware
pub mod middleware;

/// Photo handlers
pub mod photos;

/// Comment handlers
pub mod comments;

/// User profile handlers
pub mod users;

/// Transform handlers
pub mod transforms;

/// Persistence
pub mod store;

/// Image hosting
pub mod media;

/// Outgoing mail
pub mod mail;

/// Backend error types
pub mod error;

#[cfg(test)]
mod test_support;
