/**
 * Multipart Upload Forms
 *
 * Reads a `multipart/form-data` body into one file part plus plain text
 * fields. Used by the photo upload and avatar endpoints.
 */

use std::collections::HashMap;

use axum::extract::multipart::{Multipart, MultipartError};
use bytes::Bytes;

use crate::backend::error::BackendError;

/// Name of the form field carrying the image
pub const FILE_FIELD: &str = "file";

/// The uploaded file
#[derive(Debug, Clone)]
pub struct FilePart {
    pub bytes: Bytes,
    pub file_name: String,
    pub content_type: Option<String>,
}

/// A parsed upload form
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<FilePart>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Drain `multipart` into a form
    ///
    /// Unnamed parts are skipped. A repeated field keeps its last value.
    pub async fn read(mut multipart: Multipart) -> Result<Self, BackendError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == FILE_FIELD {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                form.file = Some(FilePart {
                    bytes,
                    file_name,
                    content_type,
                });
            } else {
                let value = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// The file part, which must be a non-empty image
    pub fn require_image(&mut self) -> Result<FilePart, BackendError> {
        let file = self
            .file
            .take()
            .ok_or_else(|| BackendError::validation(FILE_FIELD, "an image file is required"))?;

        if file.bytes.is_empty() {
            return Err(BackendError::validation(FILE_FIELD, "file is empty"));
        }
        if let Some(content_type) = &file.content_type {
            if !content_type.starts_with("image/") {
                return Err(BackendError::validation(
                    FILE_FIELD,
                    format!("expected an image, got {}", content_type),
                ));
            }
        }
        Ok(file)
    }

    /// Text field `name`, if present and not blank
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

fn multipart_error(err: MultipartError) -> BackendError {
    tracing::warn!("Rejected multipart body: {}", err);
    BackendError::validation(FILE_FIELD, err.body_text())
}
