//! Image Hosting Module
//!
//! Originals and avatars are stored on an external image host, which also
//! renders transformations from URL parameters. Handlers talk to the host
//! through the `ImageHost` trait:
//!
//! - **`cloudinary`** - `CloudinaryClient`, signed REST calls over `reqwest`
//! - **`memory`** - `MemoryImageHost`, keeps bytes in process; used when
//!   Cloudinary is not configured and in tests
//! - **`form`** - reads multipart upload bodies
//!
//! # Module Structure
//!
//! ```text
//! media/
//! ├── mod.rs        - ImageHost trait, upload types, MediaError
//! ├── cloudinary.rs - Cloudinary client
//! ├── memory.rs     - In-process host
//! └── form.rs       - Multipart upload forms
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::TransformParams;

/// Cloudinary REST client
pub mod cloudinary;

/// In-process image host
pub mod memory;

/// Multipart upload forms
pub mod form;

pub use cloudinary::CloudinaryClient;
pub use form::{FilePart, UploadForm};
pub use memory::MemoryImageHost;

/// Image host failures
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("request to image host failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image host returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("unexpected image host response: {0}")]
    InvalidResponse(String),
}

/// Where an upload belongs; the host derives folder and id from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    /// Original photo uploaded by `owner`
    Photo { owner: Uuid },
    /// Avatar of `user_id`; replaces any previous avatar
    Avatar { user_id: Uuid },
}

/// File to upload
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub file_name: String,
    pub target: UploadTarget,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedImage {
    pub url: String,
    pub public_id: String,
    /// Revision the host assigned to this upload; changes on overwrite
    pub version: Option<u64>,
}

/// External image storage and transformation service
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, upload: ImageUpload) -> Result<HostedImage, MediaError>;

    /// Deleting an image the host no longer has is not an error
    async fn destroy(&self, public_id: &str) -> Result<(), MediaError>;

    /// Delivery URL rendering `public_id` with `params`
    fn transformed_url(&self, public_id: &str, params: &TransformParams) -> String {
        self.versioned_url(public_id, None, params)
    }

    /// Like `transformed_url`, pinned to one revision of the image
    ///
    /// Overwritten images keep their public id, so caches only see the
    /// new content when the version in the URL changes.
    fn versioned_url(&self, public_id: &str, version: Option<u64>, params: &TransformParams) -> String;
}

/// Joins the optional transformation and version segments of a delivery path
pub(crate) fn delivery_path(public_id: &str, version: Option<u64>, params: &TransformParams) -> String {
    let mut segments = Vec::with_capacity(3);
    let transformation = transformation_segment(params);
    if !transformation.is_empty() {
        segments.push(transformation);
    }
    if let Some(version) = version {
        segments.push(format!("v{}", version));
    }
    segments.push(public_id.to_string());
    segments.join("/")
}

/// URL path segment for a transformation, e.g. `c_fill,h_250,w_250`
pub fn transformation_segment(params: &TransformParams) -> String {
    let mut parts = Vec::with_capacity(4);
    if let Some(crop) = params.crop {
        parts.push(format!("c_{}", crop.as_str()));
    }
    if let Some(effect) = params.effect {
        parts.push(format!("e_{}", effect.as_str()));
    }
    if let Some(height) = params.height {
        parts.push(format!("h_{}", height));
    }
    if let Some(width) = params.width {
        parts.push(format!("w_{}", width));
    }
    parts.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::transform::{Crop, Effect};

    #[test]
    fn test_transformation_segment() {
        let params = TransformParams {
            width: Some(300),
            height: Some(200),
            crop: Some(Crop::Thumb),
            effect: Some(Effect::Sepia),
        };
        assert_eq!(transformation_segment(&params), "c_thumb,e_sepia,h_200,w_300");
        assert_eq!(
            transformation_segment(&TransformParams::avatar()),
            "c_fill,h_250,w_250"
        );
    }

    #[test]
    fn test_delivery_path() {
        assert_eq!(
            delivery_path("avatars/1", Some(7), &TransformParams::avatar()),
            "c_fill,h_250,w_250/v7/avatars/1"
        );
        assert_eq!(delivery_path("p", None, &TransformParams::default()), "p");
        assert_eq!(delivery_path("p", Some(3), &TransformParams::default()), "v3/p");
    }
}
