//! SMTP delivery via lettre.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use typed_builder::TypedBuilder;

use newspaper_core::ports::{MailError, Mailer, OutgoingEmail};

/// SMTP relay settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Use STARTTLS. Disable only for local catch-all servers.
    pub starttls: bool,
}

#[derive(Clone, TypedBuilder)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, MailError> {
        let relay = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| MailError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        let mut builder = relay.port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        tracing::info!(host = %config.host, port = config.port, "SMTP transport configured");
        Ok(Self::builder().transport(builder.build()).build())
    }
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Build the multipart message: empty-or-plain text alternative plus HTML.
pub(crate) fn build_message(email: &OutgoingEmail) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(mailbox(&email.from)?)
        .subject(email.subject.as_str());

    for recipient in &email.to {
        builder = builder.to(mailbox(recipient)?);
    }

    builder
        .multipart(MultiPart::alternative_plain_html(
            email.text_body.clone(),
            email.html_body.clone(),
        ))
        .map_err(|e| MailError::Build(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = build_message(email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(())
    }
}
