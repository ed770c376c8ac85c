//! Outgoing Mail Module
//!
//! Account emails (confirmation links, password reset links) are plain
//! text and go out through the `Mailer` trait:
//!
//! - **`smtp`** - `SmtpMailer`, an async `lettre` SMTP transport
//! - **`outbox`** - `OutboxMailer`, logs and records messages; used when
//!   no SMTP relay is configured and in tests
//!
//! # Module Structure
//!
//! ```text
//! mail/
//! ├── mod.rs    - Mailer trait, message templates, MailError
//! ├── smtp.rs   - SMTP transport
//! └── outbox.rs - Recording mailer
//! ```

use async_trait::async_trait;
use thiserror::Error;

/// SMTP mailer
pub mod smtp;

/// Recording mailer
pub mod outbox;

pub use outbox::OutboxMailer;
pub use smtp::SmtpMailer;

/// Mail delivery failures
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// A plain-text email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    /// Email-confirmation message with a link to `confirm_url`
    pub fn confirmation(email: &str, username: &str, confirm_url: &str) -> Self {
        Self {
            to: email.to_string(),
            to_name: Some(username.to_string()),
            subject: "Confirm your email".to_string(),
            body: format!(
                "Hi {},\n\n\
                 Thanks for signing up for ImageHub. Confirm your email address by opening this link:\n\n\
                 {}\n\n\
                 The link expires in 24 hours. If you did not create an account, ignore this message.\n",
                username, confirm_url
            ),
        }
    }

    /// Password-reset message carrying the reset token
    pub fn password_reset(email: &str, username: &str, reset_url: &str, token: &str) -> Self {
        Self {
            to: email.to_string(),
            to_name: Some(username.to_string()),
            subject: "Reset your password".to_string(),
            body: format!(
                "Hi {},\n\n\
                 A password reset was requested for your ImageHub account. Open this link to choose a new password:\n\n\
                 {}\n\n\
                 Or submit this token with your new password:\n\n\
                 {}\n\n\
                 If you did not request a reset, ignore this message.\n",
                username, reset_url, token
            ),
        }
    }
}

/// Mail delivery
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}
