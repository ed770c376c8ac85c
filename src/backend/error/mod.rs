//! Backend Error Module
//!
//! Error type shared by all handlers and services, and its conversion
//! into HTTP responses.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - BackendError, status and code mapping
//! └── conversion.rs - IntoResponse implementation
//! ```
//!
//! Handlers return `Result<T, BackendError>` and propagate with `?`;
//! collaborator errors (`StoreError`, `MediaError`, `MailError`,
//! `ConfigError`, `SharedError`) convert through `From`.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
