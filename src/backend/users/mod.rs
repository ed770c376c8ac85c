//! Users Module
//!
//! Account views and changes under `/api/users`.
//!
//! # Handlers
//!
//! - **`get_me`** - GET /api/users/me
//! - **`update_avatar`** - PATCH /api/users/avatar
//! - **`get_profile`** - GET /api/users/profile/{username}
//! - **`change_role`** - PATCH /api/users/role/{user_id}

/// HTTP handlers
pub mod handlers;

pub use handlers::{change_role, get_me, get_profile, update_avatar, ProfileResponse, RoleRequest};
