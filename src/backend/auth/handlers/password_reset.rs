/**
 * Password Reset Handlers
 *
 * - `POST /api/auth/request_password_reset` - email a reset token
 * - `POST /api/auth/reset_password` - set a new password with that token
 *
 * A successful reset also clears the stored refresh token, so every
 * existing session has to log in again. Reset tokens carry a fingerprint
 * of the password hash they were issued against and stop working once
 * the password changes.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::{EmailRequest, MessageResponse, ResetPasswordRequest};
use crate::backend::auth::password::hash_password;
use crate::backend::auth::sessions::{password_fingerprint, Identity, TokenType};
use crate::backend::error::BackendError;
use crate::backend::mail::OutgoingMail;
use crate::backend::server::state::AppState;
use crate::shared::user::{validate_email, validate_password};

const RESET_SENT: &str = "If the account exists, a password reset email has been sent.";

/// Mail a password-reset token
///
/// Answers the same way whether or not the account exists.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, BackendError> {
    let email = request.email.trim().to_lowercase();
    validate_email(&email)?;

    let Some(user) = state.users.user_by_email(&email).await? else {
        tracing::info!("Password reset requested for unknown email {}", email);
        return Ok(Json(MessageResponse::new(RESET_SENT)));
    };

    let identity = Identity {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
    };
    let token = state.tokens.issue_password_reset(&identity, &user.password_hash)?;
    let link = format!("{}/api/auth/reset_password", state.public_url());

    match state
        .mailer
        .send(OutgoingMail::password_reset(&user.email, &user.username, &link, &token))
        .await
    {
        Ok(()) => tracing::info!("Password reset email sent to {}", user.email),
        Err(e) => tracing::error!("Failed to send password reset email to {}: {}", user.email, e),
    }

    Ok(Json(MessageResponse::new(RESET_SENT)))
}

/// Complete a password reset
///
/// # Errors
///
/// * `400 Bad Request` - new password fails validation
/// * `401 Unauthorized` - token expired, invalid, already used, or not a reset token
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, BackendError> {
    let claims = state.tokens.verify(request.token.trim(), TokenType::PasswordReset)?;
    validate_password(&request.new_password)?;

    let user = state.users.user_by_id(claims.sub).await?.ok_or_else(|| {
        tracing::warn!("Reset token for unknown user {}", claims.sub);
        BackendError::invalid_token("user no longer exists")
    })?;
    if claims.pwd.as_deref() != Some(password_fingerprint(&user.password_hash).as_str()) {
        tracing::warn!("Stale password reset token for {}", user.email);
        return Err(BackendError::invalid_token("reset token already used"));
    }

    let password_hash = hash_password(&request.new_password, state.config.auth.bcrypt_cost).await?;
    state.users.set_password_hash(user.id, &password_hash).await?;
    state.users.set_refresh_token(user.id, None).await?;

    tracing::info!("Password reset for {}", user.email);
    Ok(Json(MessageResponse::new("Password updated")))
}
