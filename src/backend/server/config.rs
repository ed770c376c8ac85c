/**
 * Service Configuration
 *
 * Builds the collaborators named by `AppConfig`: the store, the image
 * host and the mailer.
 *
 * # Fallbacks
 *
 * Each collaborator is optional in configuration. When its settings are
 * absent the server starts with the in-process stand-in and logs a
 * warning:
 *
 * - no `DATABASE_URL` - `MemoryStore` (data is lost on restart)
 * - no Cloudinary credentials - `MemoryImageHost`
 * - no SMTP relay - `OutboxMailer` (mail is logged, not delivered)
 *
 * Settings that are present but unusable are errors, never fallbacks.
 */

use std::sync::Arc;

use crate::backend::error::BackendError;
use crate::backend::mail::{Mailer, OutboxMailer, SmtpMailer};
use crate::backend::media::{CloudinaryClient, ImageHost, MemoryImageHost};
use crate::backend::store::PgStore;
use crate::shared::AppConfig;

/// Connect to PostgreSQL if `database_url` is set
///
/// # Returns
///
/// - `Ok(Some(store))` with migrations applied
/// - `Ok(None)` if no database is configured
///
/// # Errors
///
/// The URL is set but the database cannot be reached or migrated.
pub async fn load_database(config: &AppConfig) -> Result<Option<PgStore>, BackendError> {
    match &config.database_url {
        Some(url) => Ok(Some(PgStore::connect(url).await?)),
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store");
            Ok(None)
        }
    }
}

/// Cloudinary when configured, otherwise the in-process host
pub fn load_image_host(config: &AppConfig) -> Result<Arc<dyn ImageHost>, BackendError> {
    match &config.cloudinary {
        Some(cloudinary) => {
            tracing::info!("Using Cloudinary cloud '{}'", cloudinary.cloud_name);
            Ok(Arc::new(CloudinaryClient::new(cloudinary.clone())?))
        }
        None => {
            tracing::warn!("Cloudinary not configured; images are kept in memory");
            Ok(Arc::new(MemoryImageHost::new()))
        }
    }
}

/// SMTP when configured, otherwise the outbox
pub fn load_mailer(config: &AppConfig) -> Result<Arc<dyn Mailer>, BackendError> {
    match &config.mail {
        Some(mail) => {
            tracing::info!("Using SMTP relay {}:{}", mail.host, mail.port);
            Ok(Arc::new(SmtpMailer::new(mail)?))
        }
        None => {
            tracing::warn!("SMTP not configured; outgoing mail is only logged");
            Ok(Arc::new(OutboxMailer::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::{CloudinaryConfig, MailConfig};

    fn base() -> AppConfig {
        AppConfig::builder().jwt_secret("s").build().unwrap()
    }

    #[tokio::test]
    async fn test_no_database_url() {
        assert!(load_database(&base()).await.unwrap().is_none());
    }

    #[test]
    fn test_fallbacks_build() {
        assert!(load_image_host(&base()).is_ok());
        assert!(load_mailer(&base()).is_ok());
    }

    #[tokio::test]
    async fn test_configured_collaborators_build() {
        let config = AppConfig::builder()
            .jwt_secret("s")
            .cloudinary(CloudinaryConfig::new("demo", "key", "secret"))
            .mail(MailConfig {
                host: "smtp.example.com".to_string(),
                port: 465,
                username: "user".to_string(),
                password: "pass".to_string(),
                from: "noreply@example.com".to_string(),
                from_name: "ImageHub".to_string(),
            })
            .build()
            .unwrap();
        assert!(load_image_host(&config).is_ok());
        assert!(load_mailer(&config).is_ok());
    }
}
