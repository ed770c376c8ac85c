//! Shared Module
//!
//! Domain rules and wire types that do not depend on the HTTP layer or
//! on storage: roles, field validation, tag and paging limits,
//! transformation parameters, and application configuration.
//!
//! Every validation helper returns `SharedError`, which the backend turns
//! into a `400 Bad Request` with code `validation_error`.

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Roles and credential rules
pub mod user;

/// Photo description and tag rules
pub mod photo;

/// Comment text rules
pub mod comment;

/// Offset/limit paging
pub mod pagination;

/// Image transformation parameters
pub mod transform;

pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::SharedError;
pub use pagination::{Page, PageParams};
pub use transform::TransformParams;
pub use user::Role;
