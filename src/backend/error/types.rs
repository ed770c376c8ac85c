/**
 * Backend Error Types
 *
 * This module defines the error type returned by every HTTP handler and
 * service in the backend. Each variant maps to one HTTP status and one
 * stable machine-readable code, so clients can branch on `code` without
 * parsing messages.
 *
 * # Error Categories
 *
 * ## Request errors
 *
 * - `Validation` (via `SharedError`) - a field broke a domain rule
 * - `TagLimitExceeded` - a photo would carry more than five tags
 * - `Conflict` - a unique value (email, username) is taken
 *
 * ## Credential errors
 *
 * - `Authentication` - unknown email or wrong password
 * - `EmailNotConfirmed` - correct password, account not yet confirmed
 * - `ExpiredToken` / `InvalidToken` / `MalformedToken` - token checks
 *
 * ## Access errors
 *
 * - `Forbidden` - the caller's role and ownership do not allow the operation
 * - `NotFound` - the addressed resource does not exist
 *
 * ## Server errors
 *
 * - `Configuration` - a required setting is missing or inconsistent
 * - `ExternalService` - the image host or the mail relay failed
 * - `Internal` - the database or another internal step failed
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::mail::MailError;
use crate::backend::media::MediaError;
use crate::backend::store::StoreError;
use crate::shared::{ConfigError, SharedError};

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use imagehub::backend::error::BackendError;
///
/// let err = BackendError::not_found("photo");
/// assert_eq!(err.code(), "not_found");
/// assert_eq!(err.status_code().as_u16(), 404);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Request field failed validation
    #[error(transparent)]
    Validation(#[from] SharedError),

    /// Wrong email or password
    #[error("Incorrect email or password")]
    Authentication,

    /// Login attempted before the confirmation link was followed
    #[error("Email not confirmed")]
    EmailNotConfirmed,

    /// Token signature and structure are fine but `exp` has passed
    #[error("Token has expired")]
    ExpiredToken,

    /// Token failed signature verification, has the wrong type, or was revoked
    #[error("Invalid token: {reason}")]
    InvalidToken {
        /// What went wrong, for logs and clients
        reason: String,
    },

    /// Token could not be parsed at all
    #[error("Malformed token")]
    MalformedToken,

    /// Caller lacks the role (or ownership) the operation requires
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Human-readable error message
        message: String,
    },

    /// Addressed resource does not exist
    #[error("{resource} not found")]
    NotFound {
        /// Kind of resource, e.g. "photo"
        resource: &'static str,
    },

    /// Attaching another tag would exceed the per-photo limit
    #[error("A photo can have at most {limit} tags")]
    TagLimitExceeded {
        /// The configured limit
        limit: usize,
    },

    /// Unique value already taken
    #[error("{message}")]
    Conflict {
        /// Human-readable error message
        message: String,
    },

    /// Missing or inconsistent configuration
    #[error("Configuration error: {message}")]
    Configuration {
        /// Human-readable error message
        message: String,
    },

    /// Image host or mail relay failure
    #[error("{service} error: {message}")]
    ExternalService {
        /// Which collaborator failed
        service: &'static str,
        /// Upstream error description (logged, not returned)
        message: String,
    },

    /// Database or other internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BackendError {
    /// Create a validation error for `field`
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(SharedError::validation(field, message))
    }

    /// Create an invalid-token error
    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create a not-found error for a resource kind
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `Validation`, `TagLimitExceeded` - 400 Bad Request
    /// - credential and token errors - 401 Unauthorized
    /// - `Forbidden` - 403 Forbidden
    /// - `NotFound` - 404 Not Found
    /// - `Conflict` - 409 Conflict
    /// - `ExternalService` - 502 Bad Gateway
    /// - `Configuration`, `Internal` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::TagLimitExceeded { .. } => StatusCode::BAD_REQUEST,
            Self::Authentication
            | Self::EmailNotConfirmed
            | Self::ExpiredToken
            | Self::InvalidToken { .. }
            | Self::MalformedToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::ExternalService { .. } => StatusCode::BAD_GATEWAY,
            Self::Configuration { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Authentication => "authentication_failed",
            Self::EmailNotConfirmed => "email_not_confirmed",
            Self::ExpiredToken => "token_expired",
            Self::InvalidToken { .. } => "invalid_token",
            Self::MalformedToken => "malformed_token",
            Self::Forbidden { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::TagLimitExceeded { .. } => "tag_limit_exceeded",
            Self::Conflict { .. } => "conflict",
            Self::Configuration { .. } => "configuration_error",
            Self::ExternalService { .. } => "upstream_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Get the client-facing error message
    ///
    /// Server-side failures return a generic message; details stay in the logs.
    pub fn message(&self) -> String {
        match self {
            Self::ExternalService { service, .. } => format!("{} is unavailable", service),
            Self::Configuration { .. } | Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the response should carry `WWW-Authenticate: Bearer`
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == StatusCode::UNAUTHORIZED
    }
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity } => Self::NotFound { resource: entity },
            StoreError::Conflict(message) => Self::Conflict { message },
            StoreError::TagLimitExceeded { limit } => Self::TagLimitExceeded { limit },
            StoreError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                Self::Internal(e.to_string())
            }
        }
    }
}

impl From<MediaError> for BackendError {
    fn from(err: MediaError) -> Self {
        tracing::error!("Image host error: {}", err);
        Self::ExternalService {
            service: "Image host",
            message: err.to_string(),
        }
    }
}

impl From<MailError> for BackendError {
    fn from(err: MailError) -> Self {
        tracing::error!("Mail error: {}", err);
        Self::ExternalService {
            service: "Mail relay",
            message: err.to_string(),
        }
    }
}

impl From<ConfigError> for BackendError {
    fn from(err: ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}
