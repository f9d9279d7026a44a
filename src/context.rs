/// Application context and dependency injection
use crate::{
    account::AccountManager,
    chat::ChatRelay,
    config::ServerConfig,
    db,
    entitlements::EntitlementLedger,
    error::{ApiError, ApiResult},
    mailer::Mailer,
    media::MediaStore,
    payments::PaymentGateway,
};
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub accounts: Arc<AccountManager>,
    pub entitlements: Arc<EntitlementLedger>,
    pub payments: Arc<PaymentGateway>,
    pub media: Arc<MediaStore>,
    pub mailer: Arc<Mailer>,
    pub chat: Arc<ChatRelay>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        // Validate configuration
        config.validate()?;

        // Create data directories if they don't exist
        Self::ensure_directories(&config).await?;

        // Initialize account database
        let pool =
            db::create_pool(&config.storage.account_db, db::DatabaseOptions::default()).await?;

        // Run migrations
        db::run_migrations(&pool).await?;

        // Test connection
        db::test_connection(&pool).await?;

        // Initialize services
        let accounts = Arc::new(AccountManager::new(pool.clone()));
        let entitlements = Arc::new(EntitlementLedger::new(pool.clone()));
        let payments = Arc::new(PaymentGateway::new(config.payments.clone())?);
        let media = Arc::new(MediaStore::new(config.media.clone())?);
        let mailer = Arc::new(Mailer::new(config.email.clone())?);
        let chat = Arc::new(ChatRelay::new(config.chat.clone())?);

        tracing::info!(
            media = media.is_configured(),
            payments = payments.is_configured(),
            email = mailer.is_configured(),
            chat = chat.is_configured(),
            "External collaborators configured"
        );

        Ok(Self {
            config: Arc::new(config),
            accounts,
            entitlements,
            payments,
            media,
            mailer,
            chat,
        })
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> ApiResult<()> {
        let dir = &config.storage.data_directory;
        if !dir.exists() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                ApiError::Internal(format!("Failed to create directory {:?}: {}", dir, e))
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
