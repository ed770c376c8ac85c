/**
 * Password Hashing
 *
 * Thin async wrappers around `bcrypt`. Hashing is CPU-bound, so both
 * calls run on the blocking pool instead of a runtime worker.
 */

use crate::backend::error::BackendError;

/// Hash `password` with bcrypt at `cost`
pub async fn hash_password(password: &str, cost: u32) -> Result<String, BackendError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            tracing::error!("Password hashing task failed: {:?}", e);
            BackendError::internal("password hashing task failed")
        })?
        .map_err(|e| {
            tracing::error!("Failed to hash password: {:?}", e);
            BackendError::internal("failed to hash password")
        })
}

/// Check `password` against a stored bcrypt hash
///
/// A hash that cannot be parsed counts as a mismatch.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, BackendError> {
    let password = password.to_string();
    let hash = hash.to_string();
    let result = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {:?}", e);
            BackendError::internal("password verification task failed")
        })?;

    match result {
        Ok(valid) => Ok(valid),
        Err(e) => {
            tracing::warn!("Stored password hash is unusable: {:?}", e);
            Ok(false)
        }
    }
}
