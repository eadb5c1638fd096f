//! In-memory mailer - used when no SMTP server is configured and in tests.
//!
//! Messages are kept in memory and written to the log instead of being delivered.

use async_trait::async_trait;
use tokio::sync::RwLock;

use newspaper_core::ports::{MailError, Mailer, OutgoingEmail};

#[derive(Default)]
pub struct InMemoryMailer {
    outbox: RwLock<Vec<OutgoingEmail>>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message "sent" so far, oldest first.
    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.outbox.read().await.clone()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(
            subject = %email.subject,
            recipients = email.to.len(),
            "Email captured (no SMTP transport configured)"
        );
        self.outbox.write().await.push(email.clone());
        Ok(())
    }
}
