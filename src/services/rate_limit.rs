// src/services/rate_limit.rs
use crate::services::settings::SettingsService;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub authenticated_limit: u32,
    pub anonymous_limit: u32,
    pub per_ip_limit: u32,
    pub window_seconds: u32,
    pub whitelist_ips: Vec<String>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            authenticated_limit: 100, // per window for authenticated users
            anonymous_limit: 20,      // per window for anonymous users
            per_ip_limit: 50,         // per window per IP
            window_seconds: 60,
            whitelist_ips: vec!["127.0.0.1".to_string(), "::1".to_string()],
        }
    }
}

impl RateLimitConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(enabled) = env::var("RATE_LIMIT_ENABLED") {
            config.enabled = enabled.to_lowercase() != "false";
        }

        if let Ok(limit) = env::var("RATE_LIMIT_AUTHENTICATED") {
            if let Ok(val) = limit.parse::<u32>() {
                config.authenticated_limit = val;
            }
        }

        if let Ok(limit) = env::var("RATE_LIMIT_ANONYMOUS") {
            if let Ok(val) = limit.parse::<u32>() {
                config.anonymous_limit = val;
            }
        }

        if let Ok(limit) = env::var("RATE_LIMIT_PER_IP") {
            if let Ok(val) = limit.parse::<u32>() {
                config.per_ip_limit = val;
            }
        }

        if let Ok(window) = env::var("RATE_LIMIT_WINDOW_SECONDS") {
            if let Ok(val) = window.parse::<u32>() {
                config.window_seconds = val;
            }
        }

        if let Ok(whitelist) = env::var("RATE_LIMIT_WHITELIST_IPS") {
            config.whitelist_ips = whitelist
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        config
    }
}

#[derive(Debug, Clone)]
struct RateLimitState {
    count: u32,
    window_start: Instant,
}

impl RateLimitState {
    fn new() -> Self {
        Self {
            count: 1,
            window_start: Instant::now(),
        }
    }

    fn increment(&mut self) {
        self.count += 1;
    }

    fn reset(&mut self) {
        self.count = 1;
        self.window_start = Instant::now();
    }

    fn is_expired(&self, window_duration: Duration) -> bool {
        self.window_start.elapsed() > window_duration
    }
}

#[derive(Debug)]
pub enum RateLimitResult {
    Allowed,
    Limited { retry_after: u32 },
}

/// Fixed-window in-process rate limiter, keyed per identifier and per IP
#[derive(Debug, Clone)]
pub struct RateLimitService {
    settings_service: Arc<SettingsService>,
    rate_limiter: Arc<RwLock<HashMap<String, RateLimitState>>>,
}

impl RateLimitService {
    pub fn new(settings_service: Arc<SettingsService>) -> Self {
        let env_config = RateLimitConfig::from_env();
        info!(
            enabled = env_config.enabled,
            authenticated_limit = env_config.authenticated_limit,
            anonymous_limit = env_config.anonymous_limit,
            per_ip_limit = env_config.per_ip_limit,
            window_seconds = env_config.window_seconds,
            "Initializing RateLimitService"
        );
        Self {
            settings_service,
            rate_limiter: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Effective configuration: environment variables take precedence,
    /// database settings fill the rest
    pub async fn get_config(&self) -> RateLimitConfig {
        let mut config = RateLimitConfig::from_env();

        if env::var("RATE_LIMIT_ENABLED").is_err() {
            if let Ok(Some(enabled)) = self
                .settings_service
                .get_setting("rate_limit_enabled")
                .await
            {
                config.enabled = enabled.to_lowercase() == "true";
            }
        }

        if env::var("RATE_LIMIT_AUTHENTICATED").is_err() {
            if let Ok(Some(limit)) = self
                .settings_service
                .get_setting("rate_limit_authenticated_per_minute")
                .await
            {
                if let Ok(val) = limit.parse::<u32>() {
                    config.authenticated_limit = val;
                }
            }
        }

        if env::var("RATE_LIMIT_ANONYMOUS").is_err() {
            if let Ok(Some(limit)) = self
                .settings_service
                .get_setting("rate_limit_anonymous_per_minute")
                .await
            {
                if let Ok(val) = limit.parse::<u32>() {
                    config.anonymous_limit = val;
                }
            }
        }

        config
    }

    fn is_whitelisted(&self, ip: &str, whitelist: &[String]) -> bool {
        whitelist.iter().any(|whitelisted_ip| whitelisted_ip == ip)
    }

    /// Check rate limit for a given identifier
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        ip_address: Option<&str>,
        is_authenticated: bool,
    ) -> Result<RateLimitResult, String> {
        let config = self.get_config().await;

        if !config.enabled {
            return Ok(RateLimitResult::Allowed);
        }

        if let Some(ip) = ip_address {
            if self.is_whitelisted(ip, &config.whitelist_ips) {
                return Ok(RateLimitResult::Allowed);
            }
        }

        let limit = if is_authenticated {
            config.authenticated_limit
        } else {
            config.anonymous_limit
        };

        let window_duration = Duration::from_secs(config.window_seconds as u64);

        let user_result = self
            .check_limit_for_key(identifier, limit, window_duration)
            .await;

        if let RateLimitResult::Limited { retry_after } = user_result {
            return Ok(RateLimitResult::Limited { retry_after });
        }

        if let Some(ip) = ip_address {
            let ip_key = format!("ip:{}", ip);
            let ip_result = self
                .check_limit_for_key(&ip_key, config.per_ip_limit, window_duration)
                .await;

            if let RateLimitResult::Limited { retry_after } = ip_result {
                return Ok(RateLimitResult::Limited { retry_after });
            }
        }

        Ok(RateLimitResult::Allowed)
    }

    async fn check_limit_for_key(
        &self,
        key: &str,
        limit: u32,
        window_duration: Duration,
    ) -> RateLimitResult {
        let mut limiter = self.rate_limiter.write().await;

        let state = limiter
            .entry(key.to_string())
            .or_insert_with(RateLimitState::new);

        if state.is_expired(window_duration) {
            state.reset();
            return RateLimitResult::Allowed;
        }

        if state.count >= limit {
            let elapsed = state.window_start.elapsed().as_secs() as u32;
            let retry_after = window_duration.as_secs() as u32 - elapsed;
            return RateLimitResult::Limited { retry_after };
        }

        state.increment();
        RateLimitResult::Allowed
    }

    /// Log a rate limit violation
    pub async fn log_violation(&self, identifier: &str, ip_address: Option<&str>, endpoint: &str) {
        warn!(
            identifier = %identifier,
            ip_address = ?ip_address,
            endpoint = %endpoint,
            "Rate limit violation detected"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    async fn create_test_service() -> RateLimitService {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        let settings_service = Arc::new(SettingsService::new(pool));
        RateLimitService::new(settings_service)
    }

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert!(config.authenticated_limit > config.anonymous_limit);
        assert!(config.whitelist_ips.contains(&"127.0.0.1".to_string()));
    }

    #[tokio::test]
    async fn test_rate_limit_allows_within_limit() {
        let service = create_test_service().await;

        let result = service
            .check_rate_limit("U_TEST01", Some("192.168.1.1"), true)
            .await
            .unwrap();
        assert!(matches!(result, RateLimitResult::Allowed));
    }

    #[tokio::test]
    async fn test_whitelisted_ip_bypasses_limit() {
        let service = create_test_service().await;

        for _ in 0..500 {
            let result = service
                .check_rate_limit("anon:127.0.0.1", Some("127.0.0.1"), false)
                .await
                .unwrap();
            assert!(matches!(result, RateLimitResult::Allowed));
        }
    }

    #[tokio::test]
    async fn test_limit_for_key_blocks_at_threshold() {
        let service = create_test_service().await;
        let window = Duration::from_secs(60);

        // Counter starts at 1 on first sight and increments on each allow,
        // so a limit of 3 admits two calls before blocking
        for _ in 0..2 {
            let result = service.check_limit_for_key("key", 3, window).await;
            assert!(matches!(result, RateLimitResult::Allowed));
        }

        let result = service.check_limit_for_key("key", 3, window).await;
        assert!(matches!(result, RateLimitResult::Limited { .. }));
    }
}
