//! Tests for providers module
//!
//! These tests verify stored-key lookup and decryption behavior for the
//! BYOK generation path.

#[cfg(test)]
mod tests {
    use crate::common::{generate_provider_key_id, generate_user_id, migrations};
    use crate::providers::handlers::active_decrypted_key;
    use crate::services::encryption::EncryptionService;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use std::str::FromStr;
    use std::sync::Arc;

    async fn setup_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("valid sqlite url");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("connect to in-memory sqlite");
        migrations::run_migrations(&pool)
            .await
            .expect("run migrations");
        pool
    }

    async fn create_user(pool: &SqlitePool, username: &str) -> String {
        let id = generate_user_id();
        sqlx::query(
            r#"INSERT INTO users (id, username, email, password_hash, credits, has_linked_provider)
               VALUES (?, ?, ?, 'x', 0, 0)"#,
        )
        .bind(&id)
        .bind(username)
        .bind(format!("{}@example.com", username))
        .execute(pool)
        .await
        .expect("insert user");
        id
    }

    async fn insert_key(
        pool: &SqlitePool,
        user_id: &str,
        provider: &str,
        encrypted: &str,
        active: i64,
    ) {
        sqlx::query(
            r#"INSERT INTO provider_keys (id, user_id, provider, encrypted_key, is_active)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(generate_provider_key_id())
        .bind(user_id)
        .bind(provider)
        .bind(encrypted)
        .bind(active)
        .execute(pool)
        .await
        .expect("insert provider key");
    }

    #[tokio::test]
    async fn test_active_key_roundtrips_through_encryption() {
        let pool = setup_pool().await;
        let user_id = create_user(&pool, "byok").await;

        let encryption = Arc::new(
            EncryptionService::from_key(&EncryptionService::generate_key()).expect("key"),
        );
        let encrypted = encryption.encrypt("sk-live-byok-key").expect("encrypt");
        insert_key(&pool, &user_id, "openai", &encrypted, 1).await;

        let key = active_decrypted_key(&pool, Some(&encryption), &user_id, "openai")
            .await
            .unwrap();
        assert_eq!(key.as_deref(), Some("sk-live-byok-key"));
    }

    #[tokio::test]
    async fn test_inactive_and_foreign_keys_are_invisible() {
        let pool = setup_pool().await;
        let user_id = create_user(&pool, "byok2").await;

        let encryption = Arc::new(
            EncryptionService::from_key(&EncryptionService::generate_key()).expect("key"),
        );
        let encrypted = encryption.encrypt("sk-retired").expect("encrypt");
        insert_key(&pool, &user_id, "openai", &encrypted, 0).await;

        // Retired key is not returned
        let key = active_decrypted_key(&pool, Some(&encryption), &user_id, "openai")
            .await
            .unwrap();
        assert!(key.is_none());

        // Wrong provider is not returned
        insert_key(&pool, &user_id, "openai", &encrypted, 1).await;
        let key = active_decrypted_key(&pool, Some(&encryption), &user_id, "perplexity")
            .await
            .unwrap();
        assert!(key.is_none());
    }

    #[tokio::test]
    async fn test_missing_encryption_service_degrades_to_platform_key() {
        let pool = setup_pool().await;
        let user_id = create_user(&pool, "byok3").await;
        insert_key(&pool, &user_id, "openai", "opaque", 1).await;

        // No encryption service: the stored key is unreadable, so the
        // caller falls back to the platform key instead of erroring
        let key = active_decrypted_key(&pool, None, &user_id, "openai")
            .await
            .unwrap();
        assert!(key.is_none());
    }

    #[tokio::test]
    async fn test_undecryptable_key_degrades_to_platform_key() {
        let pool = setup_pool().await;
        let user_id = create_user(&pool, "byok4").await;

        let writer = Arc::new(
            EncryptionService::from_key(&EncryptionService::generate_key()).expect("key"),
        );
        let reader = Arc::new(
            EncryptionService::from_key(&EncryptionService::generate_key()).expect("key"),
        );
        let encrypted = writer.encrypt("sk-live").expect("encrypt");
        insert_key(&pool, &user_id, "openai", &encrypted, 1).await;

        let key = active_decrypted_key(&pool, Some(&reader), &user_id, "openai")
            .await
            .unwrap();
        assert!(key.is_none());
    }
}
