//! Comments Module
//!
//! Comments on photos under `/api/comments`. Listing is public; creating
//! needs any authenticated caller; editing needs authorship or admin;
//! deleting needs authorship or moderator.
//!
//! # Handlers
//!
//! - **`create_comment`** - POST /api/comments/{image_id}
//! - **`list_comments`** - GET /api/comments/all/{image_id}
//! - **`update_comment`** - PATCH /api/comments/{comment_id}
//! - **`delete_comment`** - DELETE /api/comments/{comment_id}

/// HTTP handlers
pub mod handlers;

pub use handlers::{create_comment, delete_comment, list_comments, update_comment, CommentRequest, CommentResponse};
