//! Transforms Module
//!
//! Saved renditions of photos under `/api/transform`. The image host
//! renders them from URL parameters; this module validates the parameters
//! and records the resulting URL.
//!
//! # Handlers
//!
//! - **`create_transform`** - POST /api/transform/create_transform/{photo_id}
//! - **`user_transforms`** - GET /api/transform/user_transforms
//! - **`get_transform`** - GET /api/transform/{id}
//! - **`update_transform`** - PATCH /api/transform/{id}
//! - **`delete_transform`** - DELETE /api/transform/{id}

/// HTTP handlers
pub mod handlers;

pub use handlers::{
    create_transform, delete_transform, get_transform, update_transform, user_transforms,
    TransformResponse,
};
