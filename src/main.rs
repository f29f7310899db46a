// src/main.rs
use axum::{extract::Extension, middleware, routing::get, Json, Router};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod analytics;
mod auth;
mod common;
mod content;
mod credits;
mod logging_middleware;
mod providers;
mod rate_limit_middleware;
mod seo;
mod services;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use common::AppState;
use credits::ledger::LedgerService;
use rate_limit_middleware::rate_limit_middleware;
use services::encryption::EncryptionService;
use services::{
    AnalyticsToolkit, OpenAIService, PerplexityService, RateLimitService, SeoToolkit,
    SettingsService,
};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://contentscale.db".to_string());
    let jwt_secret =
        env::var("JWT_SECRET").unwrap_or_else(|_| "replace_with_strong_secret".to_string());

    // Parse admin emails from comma-separated env var
    let admin_emails: HashSet<String> = env::var("ADMIN_EMAILS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    info!(admin_count = admin_emails.len(), "Loaded admin emails");

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    // Run database migrations
    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let ledger = Arc::new(LedgerService::new(pool.clone()));
    info!("LedgerService initialized");

    let encryption_service = match EncryptionService::from_env() {
        Ok(service) => Some(Arc::new(service)),
        Err(e) => {
            warn!(
                "Encryption service not available: {}. Provider key storage disabled.",
                e
            );
            None
        }
    };

    let settings_service = Arc::new(SettingsService::new(pool.clone()));
    info!("SettingsService initialized");

    let openai_service = Arc::new(OpenAIService::new(settings_service.clone()));
    info!("OpenAIService initialized");

    let perplexity_service = Arc::new(PerplexityService::new(settings_service.clone()));
    info!("PerplexityService initialized");

    let seo_toolkit = Arc::new(SeoToolkit::new(openai_service.clone()));
    let analytics_toolkit = Arc::new(AnalyticsToolkit::new(openai_service.clone()));

    let rate_limit_service = Arc::new(RateLimitService::new(settings_service.clone()));
    info!("RateLimitService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        db: pool,
        jwt_secret,
        admin_emails,
        ledger,
        encryption_service,
        settings_service,
        openai_service,
        perplexity_service,
        seo_toolkit,
        analytics_toolkit,
        rate_limit_service: rate_limit_service.clone(),
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .route("/api/health", get(health))
        // Authentication routes
        .merge(auth::auth_routes())
        // Credit ledger routes
        .merge(credits::credits_routes())
        // BYOK provider key routes
        .merge(providers::providers_routes())
        // Content generation and artifact routes
        .merge(content::content_routes())
        // SEO tool routes
        .merge(seo::seo_routes())
        // Analytics tool routes
        .merge(analytics::analytics_routes())
        // Middleware and layers
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(middleware::from_fn(rate_limit_middleware))
        .layer(Extension(rate_limit_service))
        .layer(Extension(shared.clone()))
        .layer({
            let cors_origins = std::env::var("CORS_ORIGINS").unwrap_or_else(|_| {
                "http://localhost:3000,http://localhost:5173".to_string()
            });

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::PATCH,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
