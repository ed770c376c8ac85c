/**
 * Authentication Handler Types
 *
 * Request and response bodies used by the authentication handlers. The
 * user representation is shared with the user-profile endpoints.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::store::User;
use crate::shared::Role;

/// Sign up request
#[derive(Deserialize, Serialize, Debug)]
pub struct SignupRequest {
    /// 3-50 characters
    pub username: String,
    pub email: String,
    /// 6-72 bytes; hashed before storage
    pub password: String,
}

/// Login request
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token pair returned by login and refresh
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `bearer`
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Body naming an account by email (confirmation re-send, reset request)
#[derive(Deserialize, Serialize, Debug)]
pub struct EmailRequest {
    pub email: String,
}

/// Password reset completion
#[derive(Deserialize, Serialize, Debug)]
pub struct ResetPasswordRequest {
    /// Token from the reset email
    pub token: String,
    pub new_password: String,
}

/// Plain acknowledgement
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// User response (without sensitive data)
///
/// Never carries the password hash or the stored refresh token.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub confirmed: bool,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            confirmed: user.confirmed,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
        }
    }
}
