/**
 * Transform queries
 *
 * Parameters are stored as JSONB so new transformation options need no
 * schema change.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use super::PgStore;
use crate::backend::store::{NewTransform, StoreError, Transform, TransformStore};
use crate::shared::TransformParams;

#[derive(sqlx::FromRow)]
struct TransformRow {
    id: Uuid,
    photo_id: Uuid,
    user_id: Uuid,
    url: String,
    params: Json<TransformParams>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TransformRow> for Transform {
    fn from(row: TransformRow) -> Self {
        Transform {
            id: row.id,
            photo_id: row.photo_id,
            user_id: row.user_id,
            url: row.url,
            params: row.params.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl TransformStore for PgStore {
    async fn create_transform(&self, new_transform: NewTransform) -> Result<Transform, StoreError> {
        let row = sqlx::query_as::<_, TransformRow>(
            r#"
            INSERT INTO transforms (id, photo_id, user_id, url, params, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id, photo_id, user_id, url, params, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_transform.photo_id)
        .bind(new_transform.user_id)
        .bind(&new_transform.url)
        .bind(Json(new_transform.params))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn transform_by_id(&self, id: Uuid) -> Result<Option<Transform>, StoreError> {
        let row = sqlx::query_as::<_, TransformRow>(
            r#"
            SELECT id, photo_id, user_id, url, params, created_at, updated_at
            FROM transforms
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Transform::from))
    }

    async fn list_transforms_by_user(&self, user_id: Uuid) -> Result<Vec<Transform>, StoreError> {
        let rows = sqlx::query_as::<_, TransformRow>(
            r#"
            SELECT id, photo_id, user_id, url, params, created_at, updated_at
            FROM transforms
            WHERE user_id = $1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Transform::from).collect())
    }

    async fn update_transform(&self, id: Uuid, url: &str, params: TransformParams) -> Result<Transform, StoreError> {
        let row = sqlx::query_as::<_, TransformRow>(
            r#"
            UPDATE transforms
            SET url = $2, params = $3, updated_at = $4
            WHERE id = $1
            RETURNING id, photo_id, user_id, url, params, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(url)
        .bind(Json(params))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Transform::from)
            .ok_or(StoreError::NotFound { entity: "transform" })
    }

    async fn delete_transform(&self, id: Uuid) -> Result<Transform, StoreError> {
        let row = sqlx::query_as::<_, TransformRow>(
            r#"
            DELETE FROM transforms
            WHERE id = $1
            RETURNING id, photo_id, user_id, url, params, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Transform::from)
            .ok_or(StoreError::NotFound { entity: "transform" })
    }
}
