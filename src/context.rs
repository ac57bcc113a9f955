/// Application context and dependency injection
use crate::{
    account::AccountManager,
    announcements::AnnouncementManager,
    config::ServerConfig,
    db,
    error::{HubError, HubResult},
    mailer::Mailer,
    notifications::NotificationService,
    requests::RequestManager,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub account_manager: Arc<AccountManager>,
    pub request_manager: Arc<RequestManager>,
    pub announcement_manager: Arc<AnnouncementManager>,
    pub notifications: Arc<NotificationService>,
    pub mailer: Arc<Mailer>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> HubResult<Self> {
        config.validate()?;

        Self::ensure_directories(&config).await?;

        let pool = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let config = Arc::new(config);
        let account_manager = Arc::new(AccountManager::new(pool.clone(), Arc::clone(&config)));
        let request_manager = Arc::new(RequestManager::new(pool.clone()));
        let announcement_manager = Arc::new(AnnouncementManager::new(pool.clone()));
        let notifications = Arc::new(NotificationService::new(pool.clone()));
        let mailer = Arc::new(Mailer::new(config.email.clone())?);

        Ok(Self {
            config,
            db: pool,
            account_manager,
            request_manager,
            announcement_manager,
            notifications,
            mailer,
        })
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> HubResult<()> {
        let dir = &config.storage.data_directory;
        if !dir.exists() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                HubError::Internal(format!("Failed to create directory {:?}: {}", dir, e))
            })?;
        }

        Ok(())
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
