/**
 * User Profile Handlers
 *
 * - `GET /api/users/me` - the caller's own account
 * - `PATCH /api/users/avatar` - replace the caller's avatar
 * - `GET /api/users/profile/{username}` - public profile of any user
 * - `PATCH /api/users/role/{user_id}` - change a role (admin only)
 */

use axum::{
    extract::{Multipart, Path, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::auth::policy::CHANGE_ROLE;
use crate::backend::error::BackendError;
use crate::backend::media::{ImageUpload, UploadForm, UploadTarget};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::User;
use crate::shared::{Role, TransformParams};

/// Public view of another user
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfileResponse {
    pub username: String,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub photo_count: i64,
}

/// `PATCH /api/users/role/{user_id}` body
#[derive(Deserialize, Serialize, Debug)]
pub struct RoleRequest {
    pub role: Role,
}

async fn load_user(state: &AppState, id: Uuid) -> Result<User, BackendError> {
    state
        .users
        .user_by_id(id)
        .await?
        .ok_or_else(|| BackendError::not_found("user"))
}

/// Get current user handler
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserResponse>, BackendError> {
    Ok(Json(load_user(&state, user.user_id).await?.into()))
}

/// Upload a new avatar
///
/// Stored under a fixed id per user, so the new image replaces the old
/// one. The saved URL is the host's 250x250 fill rendition pinned to the
/// upload's version, so it changes with every new avatar.
pub async fn update_avatar(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> Result<Json<UserResponse>, BackendError> {
    let mut form = UploadForm::read(multipart).await?;
    let file = form.require_image()?;

    let hosted = state
        .images
        .upload(ImageUpload {
            bytes: file.bytes,
            file_name: file.file_name,
            target: UploadTarget::Avatar {
                user_id: user.user_id,
            },
        })
        .await?;

    let url = state
        .images
        .versioned_url(&hosted.public_id, hosted.version, &TransformParams::avatar());
    let updated = state.users.set_avatar(user.user_id, &url).await?;

    tracing::info!("Avatar updated for {}", user.username);
    Ok(Json(updated.into()))
}

pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, BackendError> {
    let user = state
        .users
        .user_by_username(username.trim())
        .await?
        .ok_or_else(|| BackendError::not_found("user"))?;
    let photo_count = state.photos.count_photos_by_owner(user.id).await?;

    Ok(Json(ProfileResponse {
        username: user.username,
        avatar_url: user.avatar_url,
        role: user.role,
        created_at: user.created_at,
        photo_count,
    }))
}

/// Change another user's role
///
/// The new role applies from the target's next request, since the auth
/// middleware reads the stored role.
pub async fn change_role(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<RoleRequest>,
) -> Result<Json<UserResponse>, BackendError> {
    CHANGE_ROLE.enforce(&caller, None)?;
    if user_id == caller.user_id {
        return Err(BackendError::forbidden("Admins cannot change their own role"));
    }

    let target = load_user(&state, user_id).await?;
    let updated = state.users.set_role(target.id, request.role).await?;

    tracing::info!(
        "{} changed role of {} from {} to {}",
        caller.username,
        target.username,
        target.role,
        updated.role
    );
    Ok(Json(updated.into()))
}
