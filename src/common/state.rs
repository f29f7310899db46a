// Application state shared across all modules

use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;

use crate::credits::ledger::LedgerService;
use crate::services::encryption::EncryptionService;
use crate::services::{
    AnalyticsToolkit, OpenAIService, PerplexityService, RateLimitService, SeoToolkit,
    SettingsService,
};

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub jwt_secret: String,
    pub admin_emails: HashSet<String>,
    pub ledger: Arc<LedgerService>,
    /// None when ENCRYPTION_MASTER_KEY is unset; provider-key storage is
    /// then disabled
    pub encryption_service: Option<Arc<EncryptionService>>,
    pub settings_service: Arc<SettingsService>,
    pub openai_service: Arc<OpenAIService>,
    pub perplexity_service: Arc<PerplexityService>,
    pub seo_toolkit: Arc<SeoToolkit>,
    pub analytics_toolkit: Arc<AnalyticsToolkit>,
    pub rate_limit_service: Arc<RateLimitService>,
}
