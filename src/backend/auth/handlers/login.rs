/**
 * Login Handler
 *
 * This module implements the user authentication handler for POST /api/auth/login.
 *
 * # Authentication Process
 *
 * 1. Look up user by email
 * 2. Verify password using bcrypt
 * 3. Require a confirmed email
 * 4. Issue an access token and a refresh token
 * 5. Store the refresh token, which starts the session
 *
 * # Security
 *
 * - Unknown email and wrong password give the same error
 * - The confirmation check runs after the password check, so it never
 *   reveals whether an unconfirmed account exists
 * - Passwords are never logged or returned in responses
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::{LoginRequest, TokenResponse};
use crate::backend::auth::password::verify_password;
use crate::backend::auth::sessions::{Identity, TokenType};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Login handler
///
/// # Errors
///
/// * `401 authentication_failed` - unknown email or wrong password
/// * `401 email_not_confirmed` - correct password, unconfirmed account
///
/// # Example Response
///
/// ```json
/// {
///   "access_token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
///   "refresh_token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
///   "token_type": "bearer"
/// }
/// ```
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, BackendError> {
    let email = request.email.trim().to_lowercase();
    tracing::info!("Login request for: {}", email);

    let user = state.users.user_by_email(&email).await?.ok_or_else(|| {
        tracing::warn!("User not found: {}", email);
        BackendError::Authentication
    })?;

    if !verify_password(&request.password, &user.password_hash).await? {
        tracing::warn!("Invalid password for user: {}", email);
        return Err(BackendError::Authentication);
    }

    if !user.confirmed {
        tracing::warn!("Login before confirmation: {}", email);
        return Err(BackendError::EmailNotConfirmed);
    }

    let identity = Identity {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
    };
    let access_token = state.tokens.issue(&identity, TokenType::Access)?;
    let refresh_token = state.tokens.issue(&identity, TokenType::Refresh)?;
    state
        .users
        .set_refresh_token(user.id, Some(&refresh_token))
        .await?;

    tracing::info!("User logged in successfully: {} ({})", user.username, user.email);

    Ok(Json(TokenResponse::bearer(access_token, refresh_token)))
}
