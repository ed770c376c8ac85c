/**
 * Comment queries
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::PgStore;
use crate::backend::store::{Comment, CommentStore, NewComment, StoreError};
use crate::shared::Page;

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    photo_id: Uuid,
    user_id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            photo_id: row.photo_id,
            user_id: row.user_id,
            text: row.text,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn create_comment(&self, new_comment: NewComment) -> Result<Comment, StoreError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (id, photo_id, user_id, text, created_at, updated_at)
            SELECT $1, p.id, $3, $4, $5, $5
            FROM photos p
            WHERE p.id = $2
            RETURNING id, photo_id, user_id, text, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_comment.photo_id)
        .bind(new_comment.user_id)
        .bind(&new_comment.text)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Comment::from)
            .ok_or(StoreError::NotFound { entity: "photo" })
    }

    async fn comment_by_id(&self, id: Uuid) -> Result<Option<Comment>, StoreError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, photo_id, user_id, text, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Comment::from))
    }

    async fn list_comments(&self, photo_id: Uuid, page: Page) -> Result<Vec<Comment>, StoreError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, photo_id, user_id, text, created_at, updated_at
            FROM comments
            WHERE photo_id = $1
            ORDER BY created_at ASC, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(photo_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn update_comment(&self, id: Uuid, text: &str) -> Result<Comment, StoreError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            UPDATE comments
            SET text = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, photo_id, user_id, text, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(text)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Comment::from)
            .ok_or(StoreError::NotFound { entity: "comment" })
    }

    async fn delete_comment(&self, id: Uuid) -> Result<Comment, StoreError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            DELETE FROM comments
            WHERE id = $1
            RETURNING id, photo_id, user_id, text, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Comment::from)
            .ok_or(StoreError::NotFound { entity: "comment" })
    }
}
