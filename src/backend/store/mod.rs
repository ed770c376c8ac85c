//! Persistence Module
//!
//! Repository traits for users, photos, comments and transformations,
//! with two implementations:
//!
//! - **`postgres`** - `PgStore`, hand-written SQL over a `sqlx::PgPool`
//! - **`memory`** - `MemoryStore`, a `tokio::sync::RwLock`-guarded map set
//!   used when `DATABASE_URL` is unset and in tests
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs        - Records, traits and StoreError
//! ├── memory.rs     - In-memory implementation
//! └── postgres/     - PostgreSQL implementation, one file per trait
//! ```
//!
//! Handlers depend only on the traits (held as `Arc<dyn ...>` in
//! `AppState`) and receive plain value structs back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::{Page, Role, TransformParams};

/// In-memory implementation
pub mod memory;

/// PostgreSQL implementation
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{0}")]
    Conflict(String),

    #[error("photo already has {limit} tags")]
    TagLimitExceeded { limit: usize },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Stored account
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub confirmed: bool,
    pub avatar_url: Option<String>,
    /// Currently valid refresh token; `None` means no active session
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied at signup
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub avatar_url: Option<String>,
}

/// Stored photo with its tag names (sorted)
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    /// Image host identifier, needed to destroy or transform the image
    pub public_id: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub user_id: Uuid,
    pub url: String,
    pub public_id: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Photo list filter; `None` fields do not filter
#[derive(Debug, Clone, Default)]
pub struct PhotoFilter {
    pub owner: Option<Uuid>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    pub photo_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub photo_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
}

/// Transformed rendition of a photo
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub id: Uuid,
    pub photo_id: Uuid,
    /// Owner of the source photo
    pub user_id: Uuid,
    pub url: String,
    pub params: TransformParams,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransform {
    pub photo_id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub params: TransformParams,
}

/// Credential store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` if the email or username is taken
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError>;
    /// Like `create_user`, except the first account ever stored becomes
    /// `Admin` whatever role was asked for
    ///
    /// The emptiness check and the insert are one atomic step, so two
    /// concurrent registrations cannot both be promoted.
    async fn register_user(&self, new_user: NewUser) -> Result<User, StoreError>;
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    /// Returns `false` if the account was already confirmed
    async fn confirm_email(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), StoreError>;
    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError>;
    async fn set_avatar(&self, id: Uuid, avatar_url: &str) -> Result<User, StoreError>;
    async fn set_role(&self, id: Uuid, role: Role) -> Result<User, StoreError>;
    /// Cheap round trip used by the health check
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn create_photo(&self, new_photo: NewPhoto) -> Result<Photo, StoreError>;
    async fn photo_by_id(&self, id: Uuid) -> Result<Option<Photo>, StoreError>;
    /// Newest first
    async fn list_photos(&self, filter: &PhotoFilter, page: Page) -> Result<Vec<Photo>, StoreError>;
    async fn count_photos_by_owner(&self, owner: Uuid) -> Result<i64, StoreError>;
    async fn update_description(&self, id: Uuid, description: Option<String>) -> Result<Photo, StoreError>;
    /// Removes the photo with its comments, transforms and tag links
    async fn delete_photo(&self, id: Uuid) -> Result<(), StoreError>;
    /// Idempotent for an already attached tag; `TagLimitExceeded` at the limit
    async fn attach_tag(&self, photo_id: Uuid, tag: &str) -> Result<Photo, StoreError>;
    async fn detach_tag(&self, photo_id: Uuid, tag: &str) -> Result<Photo, StoreError>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create_comment(&self, new_comment: NewComment) -> Result<Comment, StoreError>;
    async fn comment_by_id(&self, id: Uuid) -> Result<Option<Comment>, StoreError>;
    /// Oldest first
    async fn list_comments(&self, photo_id: Uuid, page: Page) -> Result<Vec<Comment>, StoreError>;
    async fn update_comment(&self, id: Uuid, text: &str) -> Result<Comment, StoreError>;
    async fn delete_comment(&self, id: Uuid) -> Result<Comment, StoreError>;
}

#[async_trait]
pub trait TransformStore: Send + Sync {
    async fn create_transform(&self, new_transform: NewTransform) -> Result<Transform, StoreError>;
    async fn transform_by_id(&self, id: Uuid) -> Result<Option<Transform>, StoreError>;
    /// Newest first
    async fn list_transforms_by_user(&self, user_id: Uuid) -> Result<Vec<Transform>, StoreError>;
    async fn update_transform(&self, id: Uuid, url: &str, params: TransformParams) -> Result<Transform, StoreError>;
    async fn delete_transform(&self, id: Uuid) -> Result<Transform, StoreError>;
}
