//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod mailer;
mod repository;

pub use auth::{AuthError, TokenClaims, TokenService};
pub use mailer::{MailError, Mailer, OutgoingEmail};
pub use repository::{BaseRepository, CategoryRepository, PostRepository};
