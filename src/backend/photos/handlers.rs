/**
 * Photo Handlers
 *
 * All photo endpoints require an authenticated caller. Reading is open to
 * any role; changing or deleting a photo, or its tags, needs ownership or
 * the admin role.
 *
 * An upload is stored on the image host first and then recorded. If the
 * record cannot be written the hosted image is destroyed again, so no
 * unreferenced image is left behind.
 */

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::backend::auth::policy::{DELETE_PHOTO, EDIT_PHOTO, TAG_PHOTO};
use crate::backend::error::BackendError;
use crate::backend::media::{ImageUpload, UploadForm, UploadTarget};
use crate::backend::middleware::AuthUser;
use crate::backend::photos::types::{ListPhotosQuery, PhotoResponse, TagRequest, UpdatePhotoRequest};
use crate::backend::server::state::AppState;
use crate::backend::store::{NewPhoto, Photo, PhotoFilter};
use crate::shared::photo::{normalize_description, normalize_tag, parse_tags};

/// Load a photo or fail with 404
pub(crate) async fn load_photo(state: &AppState, id: Uuid) -> Result<Photo, BackendError> {
    state
        .photos
        .photo_by_id(id)
        .await?
        .ok_or_else(|| BackendError::not_found("photo"))
}

/// Upload handler
///
/// Multipart fields: `file` (required), `description`, `tags` (comma
/// separated, at most five).
pub async fn upload_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<PhotoResponse>), BackendError> {
    let mut form = UploadForm::read(multipart).await?;
    let file = form.require_image()?;
    let description = normalize_description(form.text("description"))?;
    let tags = match form.text("tags") {
        Some(raw) => parse_tags(raw)?,
        None => Vec::new(),
    };

    tracing::info!(
        "Upload of {} ({} bytes) by {}",
        file.file_name,
        file.bytes.len(),
        user.username
    );

    let hosted = state
        .images
        .upload(ImageUpload {
            bytes: file.bytes,
            file_name: file.file_name,
            target: UploadTarget::Photo {
                owner: user.user_id,
            },
        })
        .await?;

    let created = state
        .photos
        .create_photo(NewPhoto {
            user_id: user.user_id,
            url: hosted.url,
            public_id: hosted.public_id.clone(),
            description,
            tags,
        })
        .await;

    match created {
        Ok(photo) => {
            tracing::info!("Photo {} created by {}", photo.id, user.username);
            Ok((StatusCode::CREATED, Json(photo.into())))
        }
        Err(e) => {
            if let Err(cleanup) = state.images.destroy(&hosted.public_id).await {
                tracing::error!(
                    "Failed to remove orphaned image {}: {}",
                    hosted.public_id,
                    cleanup
                );
            }
            Err(e.into())
        }
    }
}

/// List photos, newest first
pub async fn list_images(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(query): Query<ListPhotosQuery>,
) -> Result<Json<Vec<PhotoResponse>>, BackendError> {
    let page = query.page_params().validate()?;
    let tag = query.tag.as_deref().map(normalize_tag).transpose()?;
    let filter = PhotoFilter {
        owner: query.owner,
        tag,
    };

    let photos = state.photos.list_photos(&filter, page).await?;
    Ok(Json(photos.into_iter().map(PhotoResponse::from).collect()))
}

pub async fn get_image(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PhotoResponse>, BackendError> {
    Ok(Json(load_photo(&state, id).await?.into()))
}

/// Change or clear the description
pub async fn update_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePhotoRequest>,
) -> Result<Json<PhotoResponse>, BackendError> {
    let photo = load_photo(&state, id).await?;
    EDIT_PHOTO.enforce(&user, Some(photo.user_id))?;

    let description = normalize_description(request.description.as_deref())?;
    let photo = state.photos.update_description(id, description).await?;
    tracing::info!("Photo {} description updated by {}", id, user.username);
    Ok(Json(photo.into()))
}

/// Delete the record, its comments and transforms, and the hosted image
///
/// Returns the deleted photo.
pub async fn delete_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PhotoResponse>, BackendError> {
    let photo = load_photo(&state, id).await?;
    DELETE_PHOTO.enforce(&user, Some(photo.user_id))?;

    state.photos.delete_photo(id).await?;
    if let Err(e) = state.images.destroy(&photo.public_id).await {
        // The record is gone; a leftover hosted image is only wasted space
        tracing::error!("Failed to destroy image {}: {}", photo.public_id, e);
    }

    tracing::info!("Photo {} deleted by {}", id, user.username);
    Ok(Json(photo.into()))
}

/// Attach a tag; attaching one the photo already has is a no-op
pub async fn add_tag(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<TagRequest>,
) -> Result<Json<PhotoResponse>, BackendError> {
    let photo = load_photo(&state, id).await?;
    TAG_PHOTO.enforce(&user, Some(photo.user_id))?;

    let name = normalize_tag(&request.name)?;
    let photo = state.photos.attach_tag(id, &name).await?;
    Ok(Json(photo.into()))
}

pub async fn remove_tag(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((id, name)): Path<(Uuid, String)>,
) -> Result<Json<PhotoResponse>, BackendError> {
    let photo = load_photo(&state, id).await?;
    TAG_PHOTO.enforce(&user, Some(photo.user_id))?;

    let name = normalize_tag(&name)?;
    let photo = state.photos.detach_tag(id, &name).await?;
    Ok(Json(photo.into()))
}
