//! Shared Error Types
//!
//! This module defines the error raised by the validation helpers in
//! `shared`. It carries no HTTP knowledge; the backend maps it onto a
//! `400 Bad Request` response.
//!
//! # Usage
//!
//! ```rust
//! use imagehub::shared::error::SharedError;
//!
//! let error = SharedError::validation("text", "Comment text cannot be empty");
//! assert_eq!(error.field(), "text");
//! ```
use thiserror::Error;

/// Errors produced by shared domain rules
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            Self::ValidationError { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = SharedError::validation("email", "Invalid email format");
        match &error {
            SharedError::ValidationError { field, message } => {
                assert_eq!(field, "email");
                assert_eq!(message, "Invalid email format");
            }
        }
        assert_eq!(error.field(), "email");
    }

    #[test]
    fn test_error_display() {
        let error = SharedError::validation("tags", "too many");
        let display = format!("{}", error);
        assert!(display.contains("'tags'"));
        assert!(display.contains("too many"));
    }

    #[test]
    fn test_error_clone() {
        let error = SharedError::validation("field", "message");
        assert_eq!(error.clone(), error);
    }
}
