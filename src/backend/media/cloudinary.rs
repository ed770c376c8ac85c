/**
 * Cloudinary Client
 *
 * Signed uploads and deletions against the Cloudinary REST API, and
 * delivery URLs with URL-based transformations.
 *
 * # Request Signing
 *
 * Every signed call sends `api_key`, `timestamp`, `signature` and
 * `signature_algorithm=sha256`. The signature is the hex SHA-256 of the
 * signed parameters sorted by name, joined as `k=v` pairs with `&`, with
 * the API secret appended. `file` and `api_key` are never signed.
 *
 * # Layout
 *
 * - photos: `{folder}/user_{owner}/original_images/{random}`
 * - avatars: `{folder}/avatars/{user_id}` (overwritten on change)
 */

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::backend::media::{
    delivery_path, HostedImage, ImageHost, ImageUpload, MediaError, UploadTarget,
};
use crate::shared::config::CloudinaryConfig;
use crate::shared::TransformParams;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
    #[serde(default)]
    version: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Cloudinary implementation of `ImageHost`
#[derive(Debug, Clone)]
pub struct CloudinaryClient {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.cloud_name,
            action
        )
    }

    /// Hex SHA-256 over the sorted `k=v&...` string followed by the API secret
    pub fn sign(&self, params: &[(&str, String)]) -> String {
        let mut sorted: Vec<&(&str, String)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.config.api_secret.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Build a multipart form carrying `params` plus the signing fields
    fn signed_form(&self, mut params: Vec<(&'static str, String)>) -> Form {
        params.push(("timestamp", chrono::Utc::now().timestamp().to_string()));
        let signature = self.sign(&params);

        let mut form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            form = form.text(key, value);
        }
        form
    }

    fn upload_params(&self, target: UploadTarget) -> Vec<(&'static str, String)> {
        let folder = self.config.upload_folder.trim_matches('/');
        match target {
            UploadTarget::Photo { owner } => vec![
                ("folder", format!("{}/user_{}/original_images", folder, owner)),
                ("public_id", Uuid::new_v4().simple().to_string()),
            ],
            UploadTarget::Avatar { user_id } => vec![
                ("public_id", format!("{}/avatars/{}", folder, user_id)),
                ("overwrite", "true".to_string()),
                ("invalidate", "true".to_string()),
            ],
        }
    }

    async fn error_from(response: reqwest::Response) -> MediaError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => "no error details".to_string(),
        };
        MediaError::Upstream { status, message }
    }
}

#[async_trait]
impl ImageHost for CloudinaryClient {
    async fn upload(&self, upload: ImageUpload) -> Result<HostedImage, MediaError> {
        let form = self.signed_form(self.upload_params(upload.target));
        let file = Part::stream(upload.bytes).file_name(upload.file_name);
        let form = form.part("file", file);

        tracing::debug!("Uploading image to Cloudinary ({:?})", upload.target);
        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        tracing::info!("Uploaded image {}", body.public_id);
        Ok(HostedImage {
            url: body.secure_url,
            public_id: body.public_id,
            version: body.version,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaError> {
        let form = self.signed_form(vec![
            ("public_id", public_id.to_string()),
            ("invalidate", "true".to_string()),
        ]);
        let response = self
            .client
            .post(self.endpoint("destroy"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        match body.result.as_str() {
            "ok" => Ok(()),
            "not found" => {
                tracing::warn!("Image {} was already gone from Cloudinary", public_id);
                Ok(())
            }
            other => Err(MediaError::InvalidResponse(format!("destroy result '{}'", other))),
        }
    }

    fn versioned_url(&self, public_id: &str, version: Option<u64>, params: &TransformParams) -> String {
        format!(
            "{}/{}/image/upload/{}",
            self.config.delivery_base_url.trim_end_matches('/'),
            self.config.cloud_name,
            delivery_path(public_id, version, params)
        )
    }
}
