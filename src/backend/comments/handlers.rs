/**
 * Comment Handlers
 */

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::auth::policy::{DELETE_COMMENT, EDIT_COMMENT};
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::photos::handlers::load_photo;
use crate::backend::server::state::AppState;
use crate::backend::store::{Comment, NewComment};
use crate::shared::comment::validate_comment_text;
use crate::shared::PageParams;

/// Body of create and update
#[derive(Deserialize, Serialize, Debug)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommentResponse {
    pub id: Uuid,
    pub photo_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            photo_id: comment.photo_id,
            user_id: comment.user_id,
            text: comment.text,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

async fn load_comment(state: &AppState, id: Uuid) -> Result<Comment, BackendError> {
    state
        .comments
        .comment_by_id(id)
        .await?
        .ok_or_else(|| BackendError::not_found("comment"))
}

pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(image_id): Path<Uuid>,
    Json(request): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), BackendError> {
    let text = validate_comment_text(&request.text)?;
    let comment = state
        .comments
        .create_comment(NewComment {
            photo_id: image_id,
            user_id: user.user_id,
            text,
        })
        .await?;

    tracing::info!("Comment {} on photo {} by {}", comment.id, image_id, user.username);
    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// Comments on a photo, oldest first
pub async fn list_comments(
    State(state): State<AppState>,
    Path(image_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<CommentResponse>>, BackendError> {
    let page = params.validate()?;
    load_photo(&state, image_id).await?;

    let comments = state.comments.list_comments(image_id, page).await?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

pub async fn update_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(comment_id): Path<Uuid>,
    Json(request): Json<CommentRequest>,
) -> Result<Json<CommentResponse>, BackendError> {
    let comment = load_comment(&state, comment_id).await?;
    EDIT_COMMENT.enforce(&user, Some(comment.user_id))?;

    let text = validate_comment_text(&request.text)?;
    let comment = state.comments.update_comment(comment_id, &text).await?;
    Ok(Json(comment.into()))
}

/// Delete a comment and return it
pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<CommentResponse>, BackendError> {
    let comment = load_comment(&state, comment_id).await?;
    DELETE_COMMENT.enforce(&user, Some(comment.user_id))?;

    let comment = state.comments.delete_comment(comment_id).await?;
    tracing::info!("Comment {} deleted by {}", comment_id, user.username);
    Ok(Json(comment.into()))
}
