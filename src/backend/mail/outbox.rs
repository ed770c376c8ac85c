/**
 * Outbox Mailer
 *
 * Logs every message and keeps it in memory instead of delivering it.
 */

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::mail::{MailError, Mailer, OutgoingMail};

#[derive(Debug, Clone, Default)]
pub struct OutboxMailer {
    sent: Arc<RwLock<Vec<OutgoingMail>>>,
}

impl OutboxMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, oldest first
    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.read().await.clone()
    }

    /// Most recent message addressed to `email`
    pub async fn last_to(&self, email: &str) -> Option<OutgoingMail> {
        self.sent
            .read()
            .await
            .iter()
            .rev()
            .find(|m| m.to == email)
            .cloned()
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "Mail not delivered (no SMTP relay configured)");
        tracing::debug!("{}", mail.body);
        self.sent.write().await.push(mail);
        Ok(())
    }
}
