use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_ADMIN_TOPIC: &str = "new_withdrawal";

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub fcm: FcmConfig,
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    /// Collection holding user records keyed by `susuAccountId`.
    pub users_collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FcmConfig {
    /// Falls back to the service-account key's project when empty.
    pub project_id: String,
    /// Fixed OAuth2 bearer token. Overrides the service-account key when set.
    pub access_token: String,
    /// Service-account JSON key, inline or as a file path.
    pub service_account_key: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    /// Topic every administrator device subscribes to.
    pub admin_topic: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            admin_topic: DEFAULT_ADMIN_TOPIC.to_string(),
        }
    }
}

impl NotifierConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let fcm_enabled = env::var("FCM_ENABLED")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        let access_token = get_env("FCM_ACCESS_TOKEN", Some(""), false)?;
        let key_required = is_prod && fcm_enabled && access_token.is_empty();

        Ok(NotifierConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("susu"), is_prod)?,
                users_collection: get_env("USERS_COLLECTION", Some("users"), false)?,
            },
            fcm: FcmConfig {
                project_id: get_env("FCM_PROJECT_ID", Some(""), false)?,
                access_token,
                service_account_key: get_env("FCM_SERVICE_ACCOUNT_KEY", Some(""), key_required)?,
                enabled: fcm_enabled,
            },
            notifications: NotificationSettings {
                admin_topic: get_env("ADMIN_TOPIC", Some(DEFAULT_ADMIN_TOPIC), false)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, required: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if required {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
