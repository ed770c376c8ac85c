/**
 * Photo Request and Response Types
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::store::Photo;
use crate::shared::PageParams;

/// `GET /api/images` query
#[derive(Deserialize, Debug, Default)]
pub struct ListPhotosQuery {
    /// Only photos uploaded by this user
    pub owner: Option<Uuid>,
    /// Only photos carrying this tag
    pub tag: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl ListPhotosQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            offset: self.offset,
            limit: self.limit,
        }
    }
}

/// `PATCH /api/images/{id}` body; `null` or blank clears the description
#[derive(Deserialize, Serialize, Debug)]
pub struct UpdatePhotoRequest {
    pub description: Option<String>,
}

/// `POST /api/images/{id}/tags` body
#[derive(Deserialize, Serialize, Debug)]
pub struct TagRequest {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PhotoResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Photo> for PhotoResponse {
    fn from(photo: Photo) -> Self {
        Self {
            id: photo.id,
            user_id: photo.user_id,
            url: photo.url,
            description: photo.description,
            tags: photo.tags,
            created_at: photo.created_at,
            updated_at: photo.updated_at,
        }
    }
}
