/**
 * Signup Handler
 *
 * This module implements the user registration handler for POST /api/auth/signup.
 *
 * # Registration Process
 *
 * 1. Validate username, email and password
 * 2. Reject an email or username that is already taken
 * 3. Hash password using bcrypt
 * 4. Create the user, unconfirmed; the first account ever created is an admin
 * 5. Email a confirmation link
 * 6. Return the created user
 *
 * A failed confirmation email is logged and does not fail the signup; the
 * user can ask for another one through `request_email`.
 */

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::email::send_confirmation;
use crate::backend::auth::handlers::types::{SignupRequest, UserResponse};
use crate::backend::auth::password::hash_password;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::store::NewUser;
use crate::shared::user::{validate_email, validate_password, validate_username};
use crate::shared::Role;

/// Signup handler
///
/// # Errors
///
/// * `400 Bad Request` - a field fails validation
/// * `409 Conflict` - email or username already registered
///
/// # Example Request
///
/// ```http
/// POST /api/auth/signup HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "username": "ann",
///   "email": "ann@example.com",
///   "password": "secret1"
/// }
/// ```
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), BackendError> {
    let username = request.username.trim().to_string();
    let email = request.email.trim().to_lowercase();
    validate_username(&username)?;
    validate_email(&email)?;
    validate_password(&request.password)?;

    tracing::info!("Signup request for: {} ({})", username, email);

    if state.users.user_by_email(&email).await?.is_some() {
        tracing::warn!("Signup with registered email: {}", email);
        return Err(BackendError::conflict("Email already registered"));
    }
    if state.users.user_by_username(&username).await?.is_some() {
        tracing::warn!("Signup with taken username: {}", username);
        return Err(BackendError::conflict("Username already taken"));
    }

    let password_hash = hash_password(&request.password, state.config.auth.bcrypt_cost).await?;
    let user = state
        .users
        .register_user(NewUser {
            username,
            email,
            password_hash,
            role: Role::Regular,
            avatar_url: None,
        })
        .await?;

    tracing::info!("User created: {} ({}) as {}", user.username, user.id, user.role);

    if let Err(e) = send_confirmation(&state, &user).await {
        tracing::error!("Failed to send confirmation email to {}: {}", user.email, e);
    }

    Ok((StatusCode::CREATED, Json(user.into())))
}
