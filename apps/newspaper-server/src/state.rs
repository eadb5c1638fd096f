//! Application state - shared across all handlers.

use std::sync::Arc;

use newspaper_core::ports::{CategoryRepository, Mailer, PostRepository, TokenService};
use newspaper_core::{NewsService, NotificationConfig, NotificationDispatcher};
use newspaper_infra::{InMemoryCategoryRepository, InMemoryMailer, InMemoryPostRepository, JwtTokenService};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub news: NewsService,
    pub tokens: Arc<dyn TokenService>,
}

type Stores = (Arc<dyn PostRepository>, Arc<dyn CategoryRepository>);

fn in_memory_stores() -> Stores {
    (
        Arc::new(InMemoryPostRepository::new()),
        Arc::new(InMemoryCategoryRepository::new()),
    )
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (posts, categories) = Self::stores(config).await;
        let mailer = Self::mailer(config);
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));

        tracing::info!(site_url = %config.notification.site_url, "Application state initialized");

        Self::from_parts(posts, categories, config.notification.clone(), mailer, tokens)
    }

    pub fn from_parts(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        notification: NotificationConfig,
        mailer: Arc<dyn Mailer>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        let dispatcher = NotificationDispatcher::new(notification, mailer);
        Self {
            news: NewsService::new(posts, categories, dispatcher),
            tokens,
        }
    }

    /// State backed entirely by in-memory stores.
    pub fn in_memory(
        notification: NotificationConfig,
        mailer: Arc<dyn Mailer>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        let (posts, categories) = in_memory_stores();
        Self::from_parts(posts, categories, notification, mailer, tokens)
    }

    #[cfg(feature = "postgres")]
    async fn stores(config: &AppConfig) -> Stores {
        use newspaper_infra::{PostgresCategoryRepository, PostgresPostRepository};

        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return in_memory_stores();
        };

        match newspaper_infra::database::connect(db_config).await {
            Ok(conn) => (
                Arc::new(PostgresPostRepository::new(conn.clone())),
                Arc::new(PostgresCategoryRepository::new(conn)),
            ),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                in_memory_stores()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn stores(_config: &AppConfig) -> Stores {
        tracing::info!("Running without postgres feature - using in-memory stores");
        in_memory_stores()
    }

    #[cfg(feature = "smtp")]
    fn mailer(config: &AppConfig) -> Arc<dyn Mailer> {
        use newspaper_infra::SmtpMailer;

        let Some(smtp) = config.smtp.as_ref() else {
            tracing::warn!("SMTP_HOST not set. Notifications will be logged, not delivered.");
            return Arc::new(InMemoryMailer::new());
        };

        match SmtpMailer::from_config(smtp) {
            Ok(mailer) => Arc::new(mailer),
            Err(e) => {
                tracing::error!("Invalid SMTP configuration: {}. Logging mail instead.", e);
                Arc::new(InMemoryMailer::new())
            }
        }
    }

    #[cfg(not(feature = "smtp"))]
    fn mailer(_config: &AppConfig) -> Arc<dyn Mailer> {
        tracing::info!("Running without smtp feature - notifications are logged");
        Arc::new(InMemoryMailer::new())
    }
}
