// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Run all database migrations
///
/// Tables are created if missing. Set RESET_DB=true to drop and recreate
/// the full schema (destroys all data).
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
    }

    create_user_tables(pool).await?;
    create_content_tables(pool).await?;
    create_ledger_tables(pool).await?;
    create_analysis_tables(pool).await?;
    create_system_tables(pool).await?;
    create_indexes(pool).await?;

    info!("Database migration completed");

    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Drop tables in reverse dependency order
    let tables = vec![
        "analytics_data",
        "seo_analyses",
        "provider_keys",
        "credit_transactions",
        "content_items",
        "system_settings",
        "users",
    ];

    for table in tables {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }

    Ok(())
}

async fn create_user_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            credits INTEGER NOT NULL DEFAULT 0 CHECK (credits >= 0),
            has_linked_provider INTEGER NOT NULL DEFAULT 0,
            provider_name TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_content_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS content_items (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            title TEXT NOT NULL,
            content TEXT,
            keywords TEXT,
            nlp_keywords TEXT,
            outline TEXT,
            content_type TEXT NOT NULL,
            ai_provider TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'draft',
            credits_used INTEGER NOT NULL DEFAULT 0 CHECK (credits_used >= 0),
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_ledger_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Append-only: rows are never updated or deleted
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS credit_transactions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            amount INTEGER NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('purchase', 'usage', 'refund')),
            description TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS provider_keys (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            provider TEXT NOT NULL,
            encrypted_key TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_analysis_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS seo_analyses (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            tool_type TEXT NOT NULL,
            input_data TEXT,
            results TEXT,
            schema_version INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analytics_data (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            tool_type TEXT NOT NULL,
            data TEXT,
            insights TEXT,
            schema_version INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_system_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS system_settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            encrypted INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_by TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    init_default_settings(pool).await?;

    Ok(())
}

/// Initialize default system settings from environment variables
/// Only sets values if they don't already exist in the database
async fn init_default_settings(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let settings = vec![
        ("openai_api_key", "OPENAI_API_KEY"),
        ("openai_base_url", "OPENAI_BASE_URL"),
        ("openai_model", "OPENAI_MODEL"),
        ("perplexity_api_key", "PERPLEXITY_API_KEY"),
        ("perplexity_base_url", "PERPLEXITY_BASE_URL"),
        ("perplexity_model", "PERPLEXITY_MODEL"),
    ];

    for (db_key, env_key) in settings {
        if let Ok(value) = env::var(env_key) {
            if !value.is_empty() {
                let existing: Option<(String,)> =
                    sqlx::query_as("SELECT value FROM system_settings WHERE key = ?")
                        .bind(db_key)
                        .fetch_optional(pool)
                        .await?;

                if existing.is_none() {
                    sqlx::query(
                        r#"
                        INSERT INTO system_settings (key, value, encrypted, updated_at, updated_by)
                        VALUES (?, ?, 0, datetime('now'), 'system')
                        "#,
                    )
                    .bind(db_key)
                    .bind(&value)
                    .execute(pool)
                    .await?;

                    info!(key = %db_key, "Initialized setting from environment variable");
                }
            }
        }
    }

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = vec![
        "CREATE INDEX IF NOT EXISTS idx_content_items_user_id ON content_items(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_content_items_status ON content_items(status)",
        "CREATE INDEX IF NOT EXISTS idx_credit_transactions_user_id ON credit_transactions(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_provider_keys_user_id ON provider_keys(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_seo_analyses_user_id ON seo_analyses(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_analytics_data_user_id ON analytics_data(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
        "CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)",
    ];

    for index in indexes {
        sqlx::query(index).execute(pool).await?;
    }

    Ok(())
}
