//! Outbound mail port.

use async_trait::async_trait;

/// A fully rendered message ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    /// Recipients as collected; may contain duplicates.
    pub to: Vec<String>,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Mail transport trait - SMTP in production, in-memory elsewhere.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Failures while rendering or delivering a message.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("Failed to render message: {0}")]
    Rendering(String),

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Transport error: {0}")]
    Transport(String),
}
