/// Configuration management for the Krishi Sahayak backend
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub media: Option<MediaConfig>,
    pub payments: Option<PaymentConfig>,
    pub email: Option<EmailConfig>,
    pub chat: Option<ChatConfig>,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
    /// Maximum request body size in bytes (inline image uploads)
    pub body_limit: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub account_db: PathBuf,
}

/// Hosted image service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub api_url: String,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub upload_preset: String,
    pub folder: String,
}

/// Payment gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    pub api_url: String,
    pub key_id: String,
    pub key_secret: String,
}

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from_address: String,
}

/// Generative model relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("KRISHI_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("KRISHI_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| ApiError::Validation("Invalid port number".to_string()))?;
        let version = env::var("KRISHI_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let body_limit = env::var("KRISHI_BODY_LIMIT")
            .unwrap_or_else(|_| "10485760".to_string())
            .parse()
            .unwrap_or(10_485_760);

        let data_directory: PathBuf = env::var("KRISHI_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let account_db = env::var("KRISHI_ACCOUNT_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("accounts.sqlite"));

        let media = if let Ok(cloud_name) = env::var("KRISHI_MEDIA_CLOUD_NAME") {
            Some(MediaConfig {
                api_url: env::var("KRISHI_MEDIA_API_URL")
                    .unwrap_or_else(|_| "https://api.cloudinary.com/v1_1".to_string()),
                cloud_name,
                api_key: env::var("KRISHI_MEDIA_API_KEY")
                    .map_err(|_| ApiError::Validation("Media API key required".to_string()))?,
                api_secret: env::var("KRISHI_MEDIA_API_SECRET")
                    .map_err(|_| ApiError::Validation("Media API secret required".to_string()))?,
                upload_preset: env::var("KRISHI_MEDIA_UPLOAD_PRESET")
                    .unwrap_or_else(|_| "ml_default".to_string()),
                folder: env::var("KRISHI_MEDIA_FOLDER")
                    .unwrap_or_else(|_| "profile_pictures".to_string()),
            })
        } else {
            None
        };

        let payments = if let Ok(key_id) = env::var("KRISHI_PAYMENT_KEY_ID") {
            Some(PaymentConfig {
                api_url: env::var("KRISHI_PAYMENT_API_URL")
                    .unwrap_or_else(|_| "https://api.razorpay.com/v1".to_string()),
                key_id,
                key_secret: env::var("KRISHI_PAYMENT_KEY_SECRET").map_err(|_| {
                    ApiError::Validation("Payment gateway secret required".to_string())
                })?,
            })
        } else {
            None
        };

        let email = if let Ok(smtp_url) = env::var("KRISHI_SMTP_URL") {
            Some(EmailConfig {
                smtp_url,
                from_address: env::var("KRISHI_MAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| format!("noreply@{}", hostname)),
            })
        } else {
            None
        };

        let chat = if let Ok(api_key) = env::var("KRISHI_CHAT_API_KEY") {
            Some(ChatConfig {
                api_url: env::var("KRISHI_CHAT_API_URL").unwrap_or_else(|_| {
                    "https://generativelanguage.googleapis.com/v1beta".to_string()
                }),
                api_key,
                model: env::var("KRISHI_CHAT_MODEL")
                    .unwrap_or_else(|_| "gemini-flash-latest".to_string()),
            })
        } else {
            None
        };

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
                body_limit,
            },
            storage: StorageConfig {
                data_directory,
                account_db,
            },
            media,
            payments,
            email,
            chat,
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ApiError::Validation("Hostname cannot be empty".to_string()));
        }

        if let Some(ref payments) = self.payments {
            if payments.key_secret.is_empty() {
                return Err(ApiError::Validation(
                    "Payment gateway secret cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
