/**
 * In-Process Image Host
 *
 * Keeps uploaded bytes in a map keyed by public id and hands out
 * `memory://` URLs. Each upload to an id bumps its version. Used when Cloudinary is not configured and by tests,
 * which can inspect what was stored.
 */

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::media::{
    delivery_path, HostedImage, ImageHost, ImageUpload, MediaError, UploadTarget,
};
use crate::shared::TransformParams;

const BASE_URL: &str = "memory://images";

#[derive(Debug)]
struct StoredImage {
    bytes: Bytes,
    version: u64,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryImageHost {
    images: Arc<RwLock<HashMap<String, StoredImage>>>,
}

impl MemoryImageHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, public_id: &str) -> bool {
        self.images.read().await.contains_key(public_id)
    }

    /// Bytes of the latest upload under `public_id`
    pub async fn bytes(&self, public_id: &str) -> Option<Bytes> {
        self.images.read().await.get(public_id).map(|image| image.bytes.clone())
    }

    pub async fn len(&self) -> usize {
        self.images.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.images.read().await.is_empty()
    }
}

#[async_trait]
impl ImageHost for MemoryImageHost {
    async fn upload(&self, upload: ImageUpload) -> Result<HostedImage, MediaError> {
        let public_id = match upload.target {
            UploadTarget::Photo { owner } => {
                format!("user_{}/original_images/{}", owner, Uuid::new_v4().simple())
            }
            UploadTarget::Avatar { user_id } => format!("avatars/{}", user_id),
        };
        tracing::debug!(
            "Storing {} ({} bytes) in memory as {}",
            upload.file_name,
            upload.bytes.len(),
            public_id
        );
        let mut images = self.images.write().await;
        let version = images.get(&public_id).map_or(1, |previous| previous.version + 1);
        images.insert(
            public_id.clone(),
            StoredImage {
                bytes: upload.bytes,
                version,
            },
        );

        Ok(HostedImage {
            url: format!("{}/{}", BASE_URL, public_id),
            public_id,
            version: Some(version),
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        if self.images.write().await.remove(public_id).is_none() {
            tracing::warn!("Image {} was already gone", public_id);
        }
        Ok(())
    }

    fn versioned_url(&self, public_id: &str, version: Option<u64>, params: &TransformParams) -> String {
        format!("{}/{}", BASE_URL, delivery_path(public_id, version, params))
    }
}
