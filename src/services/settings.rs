// src/services/settings.rs
use crate::services::encryption::{EncryptionError, EncryptionService};
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Encryption error: {0}")]
    EncryptionError(#[from] EncryptionError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone)]
struct CachedSetting {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Runtime settings backed by the system_settings table with a short TTL
/// cache and environment-variable fallback. Rows flagged `encrypted` are
/// decrypted transparently on read.
#[derive(Debug)]
pub struct SettingsService {
    db_pool: SqlitePool,
    cache: Arc<RwLock<HashMap<String, CachedSetting>>>,
    encryption_service: Option<EncryptionService>,
    cache_ttl: Duration,
}

impl SettingsService {
    /// Create a new SettingsService instance
    pub fn new(db_pool: SqlitePool) -> Self {
        // Encryption is optional; without it, encrypted rows fail closed
        let encryption_service = match EncryptionService::from_env() {
            Ok(service) => {
                info!("Encryption service initialized");
                Some(service)
            }
            Err(e) => {
                warn!(
                    "Encryption service not available: {}. Encrypted settings will be unreadable.",
                    e
                );
                None
            }
        };

        Self {
            db_pool,
            cache: Arc::new(RwLock::new(HashMap::new())),
            encryption_service,
            cache_ttl: Duration::minutes(5),
        }
    }

    /// Get a setting value by key
    /// Falls back to the matching environment variable if not in the database
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, SettingsError> {
        // Check cache first
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(key) {
                if cached.expires_at > Utc::now() {
                    debug!(key = %key, "Setting retrieved from cache");
                    return Ok(Some(cached.value.clone()));
                }
            }
        }

        // Query database
        let result = sqlx::query_as::<_, (String, String, Option<i64>)>(
            "SELECT key, value, encrypted FROM system_settings WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.db_pool)
        .await?;

        if let Some((_, value, encrypted)) = result {
            let decrypted_value = if encrypted.unwrap_or(0) == 1 {
                match &self.encryption_service {
                    Some(service) => service.decrypt(&value).map_err(|e| {
                        error!(key = %key, error = %e, "Failed to decrypt setting");
                        SettingsError::EncryptionError(e)
                    })?,
                    None => {
                        error!(key = %key, "Setting is encrypted but encryption service not available");
                        return Err(SettingsError::InvalidConfig(
                            "Encryption service not configured".to_string(),
                        ));
                    }
                }
            } else {
                value
            };

            // Update cache
            {
                let mut cache = self.cache.write().await;
                cache.insert(
                    key.to_string(),
                    CachedSetting {
                        value: decrypted_value.clone(),
                        expires_at: Utc::now() + self.cache_ttl,
                    },
                );
            }

            debug!(key = %key, "Setting retrieved from database");
            Ok(Some(decrypted_value))
        } else {
            // Fallback to environment variable
            if let Ok(env_value) = env::var(key.to_uppercase()) {
                debug!(key = %key, "Setting retrieved from environment variable");
                return Ok(Some(env_value));
            }

            debug!(key = %key, "Setting not found");
            Ok(None)
        }
    }

    /// Get a setting value, or the given default when unset
    pub async fn get_setting_or(&self, key: &str, default: &str) -> Result<String, SettingsError> {
        Ok(self
            .get_setting(key)
            .await?
            .unwrap_or_else(|| default.to_string()))
    }
}
