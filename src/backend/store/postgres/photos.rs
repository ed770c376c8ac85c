/**
 * Photo and tag queries
 *
 * Tags are aggregated into a sorted `TEXT[]` per photo. Multi-row writes
 * run in one transaction; `attach_tag` locks the photo row first so two
 * concurrent attaches cannot both pass the tag-count check.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use super::PgStore;
use crate::backend::store::{NewPhoto, Photo, PhotoFilter, PhotoStore, StoreError};
use crate::shared::photo::MAX_TAGS_PER_PHOTO;
use crate::shared::Page;

const PHOTO_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.url, p.public_id, p.description, p.created_at, p.updated_at,
           COALESCE(
               array_agg(t.name::TEXT ORDER BY t.name) FILTER (WHERE t.name IS NOT NULL),
               ARRAY[]::TEXT[]
           ) AS tags
    FROM photos p
    LEFT JOIN photo_tags pt ON pt.photo_id = p.id
    LEFT JOIN tags t ON t.id = pt.tag_id
"#;

#[derive(sqlx::FromRow)]
struct PhotoRow {
    id: Uuid,
    user_id: Uuid,
    url: String,
    public_id: String,
    description: Option<String>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PhotoRow> for Photo {
    fn from(row: PhotoRow) -> Self {
        Photo {
            id: row.id,
            user_id: row.user_id,
            url: row.url,
            public_id: row.public_id,
            description: row.description,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insert the tag if it is new and return its id
async fn upsert_tag(conn: &mut PgConnection, name: &str) -> Result<Uuid, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO tags (id, name, created_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await
}

async fn touch_photo(conn: &mut PgConnection, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE photos SET updated_at = $2 WHERE id = $1")
        .bind(id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

impl PgStore {
    async fn require_photo(&self, id: Uuid) -> Result<Photo, StoreError> {
        self.photo_by_id(id)
            .await?
            .ok_or(StoreError::NotFound { entity: "photo" })
    }
}

#[async_trait]
impl PhotoStore for PgStore {
    async fn create_photo(&self, new_photo: NewPhoto) -> Result<Photo, StoreError> {
        let mut tags: Vec<&str> = Vec::new();
        for tag in &new_photo.tags {
            if !tags.contains(&tag.as_str()) {
                tags.push(tag);
            }
        }
        if tags.len() > MAX_TAGS_PER_PHOTO {
            return Err(StoreError::TagLimitExceeded { limit: MAX_TAGS_PER_PHOTO });
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO photos (id, user_id, url, public_id, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            "#,
        )
        .bind(id)
        .bind(new_photo.user_id)
        .bind(&new_photo.url)
        .bind(&new_photo.public_id)
        .bind(&new_photo.description)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for name in tags {
            let tag_id = upsert_tag(&mut tx, name).await?;
            sqlx::query("INSERT INTO photo_tags (photo_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        self.require_photo(id).await
    }

    async fn photo_by_id(&self, id: Uuid) -> Result<Option<Photo>, StoreError> {
        let sql = format!("{} WHERE p.id = $1 GROUP BY p.id", PHOTO_SELECT);
        let row = sqlx::query_as::<_, PhotoRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Photo::from))
    }

    async fn list_photos(&self, filter: &PhotoFilter, page: Page) -> Result<Vec<Photo>, StoreError> {
        let sql = format!(
            r#"
            {}
            WHERE ($1::UUID IS NULL OR p.user_id = $1)
              AND ($2::TEXT IS NULL OR EXISTS (
                    SELECT 1 FROM photo_tags fpt
                    JOIN tags ft ON ft.id = fpt.tag_id
                    WHERE fpt.photo_id = p.id AND ft.name = $2))
            GROUP BY p.id
            ORDER BY p.created_at DESC, p.id
            LIMIT $3 OFFSET $4
            "#,
            PHOTO_SELECT
        );
        let rows = sqlx::query_as::<_, PhotoRow>(&sql)
            .bind(filter.owner)
            .bind(filter.tag.as_deref())
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Photo::from).collect())
    }

    async fn count_photos_by_owner(&self, owner: Uuid) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM photos WHERE user_id = $1")
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn update_description(&self, id: Uuid, description: Option<String>) -> Result<Photo, StoreError> {
        let result = sqlx::query("UPDATE photos SET description = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(&description)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "photo" });
        }
        self.require_photo(id).await
    }

    async fn delete_photo(&self, id: Uuid) -> Result<(), StoreError> {
        // comments, transforms and tag links go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "photo" });
        }
        Ok(())
    }

    async fn attach_tag(&self, photo_id: Uuid, tag: &str) -> Result<Photo, StoreError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM photos WHERE id = $1 FOR UPDATE")
            .bind(photo_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(StoreError::NotFound { entity: "photo" });
        }

        let tag_id = upsert_tag(&mut tx, tag).await?;
        let inserted = sqlx::query(
            r#"
            INSERT INTO photo_tags (photo_id, tag_id)
            SELECT $1, $2
            WHERE (SELECT COUNT(*) FROM photo_tags WHERE photo_id = $1) < $3
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(photo_id)
        .bind(tag_id)
        .bind(MAX_TAGS_PER_PHOTO as i64)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            let already_attached: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM photo_tags WHERE photo_id = $1 AND tag_id = $2)",
            )
            .bind(photo_id)
            .bind(tag_id)
            .fetch_one(&mut *tx)
            .await?;
            if !already_attached {
                return Err(StoreError::TagLimitExceeded { limit: MAX_TAGS_PER_PHOTO });
            }
        } else {
            touch_photo(&mut tx, photo_id).await?;
        }

        tx.commit().await?;
        self.require_photo(photo_id).await
    }

    async fn detach_tag(&self, photo_id: Uuid, tag: &str) -> Result<Photo, StoreError> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query(
            r#"
            DELETE FROM photo_tags
            USING tags
            WHERE photo_tags.tag_id = tags.id
              AND photo_tags.photo_id = $1
              AND tags.name = $2
            "#,
        )
        .bind(photo_id)
        .bind(tag)
        .execute(&mut *tx)
        .await?;

        if removed.rows_affected() == 0 {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM photos WHERE id = $1)")
                .bind(photo_id)
                .fetch_one(&mut *tx)
                .await?;
            let entity = if exists { "tag" } else { "photo" };
            return Err(StoreError::NotFound { entity });
        }

        touch_photo(&mut tx, photo_id).await?;
        tx.commit().await?;
        self.require_photo(photo_id).await
    }
}
