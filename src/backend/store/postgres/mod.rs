/**
 * PostgreSQL Store
 *
 * `PgStore` implements the store traits with hand-written SQL through
 * `sqlx::query_as`. Each submodule keeps a private `FromRow` row struct
 * and converts it into the plain record type from `store`.
 *
 * Schema lives in `migrations/` and is applied by `PgStore::connect`.
 */

use sqlx::PgPool;

use crate::backend::store::StoreError;

mod comments;
mod photos;
mod transforms;
mod users;

/// Store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool (migrations are assumed to be applied)
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and run pending migrations
    ///
    /// # Errors
    ///
    /// Unlike a missing `DATABASE_URL`, a URL that cannot be reached or
    /// migrated is an error: the server must not silently fall back to
    /// memory when a database was asked for.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        tracing::info!("Connecting to database...");
        let pool = PgPool::connect(database_url).await?;
        tracing::info!("Database connection pool created successfully");

        tracing::info!("Running database migrations...");
        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| StoreError::Database(e.into()))?;
        tracing::info!("Database migrations completed successfully");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a unique-constraint violation onto `StoreError::Conflict`
fn conflict_or_database(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = match db_err.constraint() {
                Some("users_username_key") => "Username already taken",
                Some("users_email_key") => "Email already registered",
                _ => "Resource already exists",
            };
            return StoreError::Conflict(message.to_string());
        }
    }
    StoreError::Database(err)
}
