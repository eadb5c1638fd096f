//! Application configuration loaded from environment variables.

use std::env;

use newspaper_core::NotificationConfig;
use newspaper_infra::JwtConfig;
use newspaper_infra::database::DatabaseConfig;
#[cfg(feature = "smtp")]
use newspaper_infra::SmtpConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "smtp")]
    pub smtp: Option<SmtpConfig>,
    pub notification: NotificationConfig,
    pub jwt: JwtConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_var("PORT").unwrap_or(8080);

        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(20),
            min_connections: parse_var("DB_MIN_CONNECTIONS").unwrap_or(2),
        });

        let site_url = env::var("SITE_URL").unwrap_or_else(|_| format!("http://{host}:{port}"));
        let from_address =
            env::var("DEFAULT_FROM_EMAIL").unwrap_or_else(|_| "newspaper@localhost".to_string());

        Self {
            database,
            #[cfg(feature = "smtp")]
            smtp: Self::smtp_from_env(),
            notification: NotificationConfig::new(site_url, from_address),
            jwt: JwtConfig::from_env(),
            host,
            port,
        }
    }

    /// SMTP settings, present only when `SMTP_HOST` is set.
    #[cfg(feature = "smtp")]
    fn smtp_from_env() -> Option<SmtpConfig> {
        let host = env::var("SMTP_HOST").ok()?;
        Some(SmtpConfig {
            host,
            port: parse_var("SMTP_PORT").unwrap_or(587),
            username: env::var("SMTP_USERNAME").ok(),
            password: env::var("SMTP_PASSWORD").ok(),
            starttls: env::var("SMTP_STARTTLS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}
