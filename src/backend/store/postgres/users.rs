/**
 * User queries
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{conflict_or_database, PgStore};
use crate::backend::store::{NewUser, StoreError, User, UserStore};
use crate::shared::Role;

const USER_COLUMNS: &str = "id, username, email, password_hash, role, confirmed, avatar_url, \
                            refresh_token, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    confirmed: bool,
    avatar_url: Option<String>,
    refresh_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e: crate::shared::SharedError| StoreError::Database(sqlx::Error::Decode(e.into())))?;
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role,
            confirmed: row.confirmed,
            avatar_url: row.avatar_url,
            refresh_token: row.refresh_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PgStore {
    async fn fetch_user(&self, column: &str, value: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }
}

async fn insert_user<'e, E>(executor: E, new_user: &NewUser) -> Result<User, StoreError>
where
    E: sqlx::PgExecutor<'e>,
{
    let sql = format!(
        r#"
        INSERT INTO users (id, username, email, password_hash, role, avatar_url, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        RETURNING {}
        "#,
        USER_COLUMNS
    );
    let row = sqlx::query_as::<_, UserRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .bind(&new_user.avatar_url)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
        .map_err(conflict_or_database)?;
    row.try_into()
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        insert_user(&self.pool, &new_user).await
    }

    async fn register_user(&self, mut new_user: NewUser) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;
        // Self-conflicting lock: concurrent registrations queue here
        sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;
        let any_user: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users)")
            .fetch_one(&mut *tx)
            .await?;
        if !any_user {
            new_user.role = Role::Admin;
        }

        let user = insert_user(&mut *tx, &new_user).await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.fetch_user("email", email).await
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.fetch_user("username", username).await
    }

    async fn confirm_email(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET confirmed = TRUE, updated_at = $2
            WHERE id = $1 AND confirmed = FALSE
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }
        match self.user_by_id(id).await? {
            Some(_) => Ok(false),
            None => Err(StoreError::NotFound { entity: "user" }),
        }
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET refresh_token = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(token)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "user" });
        }
        Ok(())
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "user" });
        }
        Ok(())
    }

    async fn set_avatar(&self, id: Uuid, avatar_url: &str) -> Result<User, StoreError> {
        let sql = format!(
            "UPDATE users SET avatar_url = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(avatar_url)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound { entity: "user" })?
            .try_into()
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<User, StoreError> {
        let sql = format!(
            "UPDATE users SET role = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(role.as_str())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound { entity: "user" })?
            .try_into()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
