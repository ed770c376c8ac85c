/**
 * Session Handlers
 *
 * - `GET /api/auth/refresh_token` - trade the refresh token (sent as the
 *   bearer token) for a new access token
 * - `POST /api/auth/logout` - end the caller's session
 *
 * Only the refresh token stored on the user is accepted. Presenting any
 * other validly signed refresh token is treated as replay: the stored
 * token is cleared, which ends the session everywhere.
 */

use axum::{extract::State, http::HeaderMap, response::Json};

use crate::backend::auth::handlers::types::{MessageResponse, TokenResponse};
use crate::backend::auth::sessions::TokenType;
use crate::backend::error::BackendError;
use crate::backend::middleware::{bearer_token, AuthUser};
use crate::backend::server::state::AppState;

/// Refresh handler
///
/// Returns a new access token and the same refresh token; the refresh
/// token's expiry is not extended.
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, BackendError> {
    let token = bearer_token(&headers)?;
    let claims = state.tokens.verify(token, TokenType::Refresh)?;

    let user = state.users.user_by_id(claims.sub).await?.ok_or_else(|| {
        tracing::warn!("Refresh for unknown user {}", claims.sub);
        BackendError::invalid_token("user no longer exists")
    })?;

    if user.refresh_token.as_deref() != Some(token) {
        tracing::warn!("Refresh token mismatch for {}; revoking session", user.id);
        state.users.set_refresh_token(user.id, None).await?;
        return Err(BackendError::invalid_token("refresh token revoked"));
    }

    let access_token = state.tokens.refresh(&claims, user.role)?;
    tracing::debug!("Access token refreshed for {}", user.id);

    Ok(Json(TokenResponse::bearer(access_token, token.to_string())))
}

/// Logout handler
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<MessageResponse>, BackendError> {
    state.users.set_refresh_token(user.user_id, None).await?;
    tracing::info!("User logged out: {}", user.username);
    Ok(Json(MessageResponse::new("Logged out")))
}
