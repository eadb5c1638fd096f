//! Mail transports - SMTP and in-memory fallback.

mod memory;

pub use memory::InMemoryMailer;

#[cfg(feature = "smtp")]
mod smtp;
#[cfg(feature = "smtp")]
pub use self::smtp::{SmtpConfig, SmtpMailer};
