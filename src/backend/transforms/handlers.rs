/**
 * Transform Handlers
 *
 * A transform records a rendition of a photo: the requested parameters
 * and the URL at which the image host serves the result. Only the photo
 * owner (or an admin) may create, read, change or delete one.
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::auth::policy::MANAGE_TRANSFORM;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::photos::handlers::load_photo;
use crate::backend::server::state::AppState;
use crate::backend::store::{NewTransform, Transform};
use crate::shared::TransformParams;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TransformResponse {
    pub id: Uuid,
    pub photo_id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub params: TransformParams,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Transform> for TransformResponse {
    fn from(transform: Transform) -> Self {
        Self {
            id: transform.id,
            photo_id: transform.photo_id,
            user_id: transform.user_id,
            url: transform.url,
            params: transform.params,
            created_at: transform.created_at,
            updated_at: transform.updated_at,
        }
    }
}

async fn load_transform(state: &AppState, id: Uuid) -> Result<Transform, BackendError> {
    state
        .transforms
        .transform_by_id(id)
        .await?
        .ok_or_else(|| BackendError::not_found("transform"))
}

pub async fn create_transform(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(photo_id): Path<Uuid>,
    Json(params): Json<TransformParams>,
) -> Result<(StatusCode, Json<TransformResponse>), BackendError> {
    let photo = load_photo(&state, photo_id).await?;
    MANAGE_TRANSFORM.enforce(&user, Some(photo.user_id))?;
    params.validate()?;

    let url = state.images.transformed_url(&photo.public_id, &params);
    let transform = state
        .transforms
        .create_transform(NewTransform {
            photo_id,
            user_id: photo.user_id,
            url,
            params,
        })
        .await?;

    tracing::info!("Transform {} of photo {} created", transform.id, photo_id);
    Ok((StatusCode::CREATED, Json(transform.into())))
}

/// Transforms of the caller's photos
pub async fn user_transforms(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<TransformResponse>>, BackendError> {
    let transforms = state.transforms.list_transforms_by_user(user.user_id).await?;
    Ok(Json(transforms.into_iter().map(TransformResponse::from).collect()))
}

pub async fn get_transform(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TransformResponse>, BackendError> {
    let transform = load_transform(&state, id).await?;
    MANAGE_TRANSFORM.enforce(&user, Some(transform.user_id))?;
    Ok(Json(transform.into()))
}

/// Replace the parameters and re-derive the URL
pub async fn update_transform(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(params): Json<TransformParams>,
) -> Result<Json<TransformResponse>, BackendError> {
    let transform = load_transform(&state, id).await?;
    MANAGE_TRANSFORM.enforce(&user, Some(transform.user_id))?;
    params.validate()?;

    let photo = load_photo(&state, transform.photo_id).await?;
    let url = state.images.transformed_url(&photo.public_id, &params);
    let transform = state.transforms.update_transform(id, &url, params).await?;
    Ok(Json(transform.into()))
}

pub async fn delete_transform(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TransformResponse>, BackendError> {
    let transform = load_transform(&state, id).await?;
    MANAGE_TRANSFORM.enforce(&user, Some(transform.user_id))?;

    let transform = state.transforms.delete_transform(id).await?;
    tracing::info!("Transform {} deleted by {}", id, user.username);
    Ok(Json(transform.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::NewPhoto;
    use crate::backend::test_support::{caller, fixture};
    use crate::shared::transform::{Crop, Effect};
    use crate::shared::Role;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_transform_lifecycle() {
        let fx = fixture();
        let ann = fx.user("ann", Role::Regular).await;
        let bob = fx.user("bob", Role::Moderator).await;
        let photo = fx
            .state
            .photos
            .create_photo(NewPhoto {
                user_id: ann.id,
                url: "memory://images/p1".to_string(),
                public_id: "p1".to_string(),
                description: None,
                tags: vec![],
            })
            .await
            .unwrap();

        let params = TransformParams {
            width: Some(300),
            crop: Some(Crop::Fill),
            ..TransformParams::default()
        };
        let (status, Json(created)) = create_transform(
            State(fx.state.clone()),
            AuthUser(caller(&ann)),
            Path(photo.id),
            Json(params),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(created.url.ends_with("/c_fill,w_300/p1"));

        let by_bob = get_transform(State(fx.state.clone()), AuthUser(caller(&bob)), Path(created.id)).await;
        assert_matches!(by_bob, Err(BackendError::Forbidden { .. }));

        let Json(updated) = update_transform(
            State(fx.state.clone()),
            AuthUser(caller(&ann)),
            Path(created.id),
            Json(TransformParams {
                effect: Some(Effect::Grayscale),
                ..TransformParams::default()
            }),
        )
        .await
        .unwrap();
        assert!(updated.url.ends_with("/e_grayscale/p1"));

        let Json(mine) = user_transforms(State(fx.state.clone()), AuthUser(caller(&ann)))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);

        delete_transform(State(fx.state.clone()), AuthUser(caller(&ann)), Path(created.id))
            .await
            .unwrap();
        let gone = get_transform(State(fx.state.clone()), AuthUser(caller(&ann)), Path(created.id)).await;
        assert_matches!(gone, Err(BackendError::NotFound { resource: "transform" }));
    }

    #[tokio::test]
    async fn test_empty_params_rejected() {
        let fx = fixture();
        let ann = fx.user("ann", Role::Regular).await;
        let photo = fx
            .state
            .photos
            .create_photo(NewPhoto {
                user_id: ann.id,
                url: "memory://images/p1".to_string(),
                public_id: "p1".to_string(),
                description: None,
                tags: vec![],
            })
            .await
            .unwrap();

        let result = create_transform(
            State(fx.state.clone()),
            AuthUser(caller(&ann)),
            Path(photo.id),
            Json(TransformParams::default()),
        )
        .await;
        assert_matches!(result, Err(BackendError::Validation(_)));
    }
}
