//! # NewsPaper Infrastructure
//!
//! Concrete implementations of the ports defined in `newspaper-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - In-memory stores and mailer only
//! - `postgres` - PostgreSQL post store and category registry via SeaORM
//! - `smtp` - SMTP delivery via lettre
//! - `auth` - JWT bearer tokens

pub mod database;
pub mod mail;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use database::{InMemoryCategoryRepository, InMemoryPostRepository};
pub use mail::InMemoryMailer;

#[cfg(feature = "postgres")]
pub use database::{PostgresCategoryRepository, PostgresPostRepository};

#[cfg(feature = "smtp")]
pub use mail::{SmtpConfig, SmtpMailer};

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenService};
