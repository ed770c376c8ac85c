//! Photos Module
//!
//! Upload, listing, description edits, deletion and tag management for
//! `/api/images`.
//!
//! # Module Structure
//!
//! ```text
//! photos/
//! ├── mod.rs      - Module exports
//! ├── types.rs    - Request and response types
//! └── handlers.rs - HTTP handlers
//! ```
//!
//! # Handlers
//!
//! - **`upload_image`** - POST /api/images/upload_image
//! - **`list_images`** - GET /api/images
//! - **`get_image`** - GET /api/images/{id}
//! - **`update_image`** - PATCH /api/images/{id}
//! - **`delete_image`** - DELETE /api/images/{id}
//! - **`add_tag`** - POST /api/images/{id}/tags
//! - **`remove_tag`** - DELETE /api/images/{id}/tags/{name}

/// Request and response types
pub mod types;

/// HTTP handlers
pub mod handlers;

pub use handlers::{add_tag, delete_image, get_image, list_images, remove_tag, update_image, upload_image};
pub use types::PhotoResponse;
