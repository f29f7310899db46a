//! Tests for the credit ledger
//!
//! These tests verify the ledger invariants against an in-memory SQLite
//! pool: reconciliation, non-negative balances, double-spend protection,
//! cost computation, and append-order transaction listing.

#[cfg(test)]
mod tests {
    use crate::common::{generate_user_id, migrations};
    use crate::credits::ledger::{
        LedgerError, LedgerService, BYOK_RATE_CREDITS, PLATFORM_RATE_CREDITS,
        SIGNUP_GRANT_CREDITS,
    };
    use crate::credits::models::Entitlement;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use std::str::FromStr;

    /// In-memory pool capped at one connection so every test sees a single
    /// database and writers serialize exactly as they do in production
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

    async fn balance_of(pool: &SqlitePool, user_id: &str) -> i64 {
        let (credits,): (i64,) = sqlx::query_as("SELECT credits FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .expect("fetch balance");
        credits
    }

    #[test]
    fn test_cost_per_article_is_pure() {
        let platform = Entitlement {
            user_id: "U_TEST01".to_string(),
            balance: 10,
            has_linked_provider: false,
            provider: None,
        };
        let byok = Entitlement {
            user_id: "U_TEST02".to_string(),
            balance: 0,
            has_linked_provider: true,
            provider: Some("openai".to_string()),
        };

        // Referentially transparent: repeated calls agree, balance is ignored
        assert_eq!(LedgerService::cost_per_article(&platform), PLATFORM_RATE_CREDITS);
        assert_eq!(LedgerService::cost_per_article(&platform), PLATFORM_RATE_CREDITS);
        assert_eq!(LedgerService::cost_per_article(&byok), BYOK_RATE_CREDITS);
        assert!(BYOK_RATE_CREDITS < PLATFORM_RATE_CREDITS);
    }

    #[test]
    fn test_can_authorize_requires_balance_for_everyone() {
        let byok_broke = Entitlement {
            user_id: "U_TEST03".to_string(),
            balance: 0,
            has_linked_provider: true,
            provider: Some("openai".to_string()),
        };

        // Linking a provider lowers the rate; it does not bypass the ledger
        assert!(!LedgerService::can_authorize(&byok_broke, BYOK_RATE_CREDITS));

        let funded = Entitlement {
            balance: 2,
            ..byok_broke
        };
        assert!(LedgerService::can_authorize(&funded, BYOK_RATE_CREDITS));
    }

    #[tokio::test]
    async fn test_reconciliation_invariant() {
        let pool = setup_pool().await;
        let ledger = LedgerService::new(pool.clone());
        let user_id = create_user(&pool, "reconcile").await;

        ledger.grant_signup_credits(&user_id).await.unwrap();
        ledger
            .record_purchase(&user_id, 500, 10, Some("starter pack"))
            .await
            .unwrap();
        ledger
            .authorize_and_debit(&user_id, 2, "article: rust crates")
            .await
            .unwrap();
        ledger
            .record_refund(&user_id, 1, Some("goodwill"))
            .await
            .unwrap();
        ledger
            .authorize_and_debit(&user_id, 2, "article: sqlite pools")
            .await
            .unwrap();

        let transactions = ledger.list_transactions(&user_id).await.unwrap();
        let sum: i64 = transactions.iter().map(|t| t.amount).sum();

        assert_eq!(sum, balance_of(&pool, &user_id).await);
        assert_eq!(sum, SIGNUP_GRANT_CREDITS + 10 - 2 + 1 - 2);
    }

    #[tokio::test]
    async fn test_debit_never_drives_balance_negative() {
        let pool = setup_pool().await;
        let ledger = LedgerService::new(pool.clone());
        let user_id = create_user(&pool, "nonneg").await;

        ledger.grant_signup_credits(&user_id).await.unwrap();
        assert_eq!(balance_of(&pool, &user_id).await, 1);

        let err = ledger
            .authorize_and_debit(&user_id, 2, "article")
            .await
            .unwrap_err();

        match err {
            LedgerError::InsufficientCredits { balance, cost } => {
                assert_eq!(balance, 1);
                assert_eq!(cost, 2);
            }
            other => panic!("expected InsufficientCredits, got {:?}", other),
        }

        // Balance untouched, no usage row appended
        assert_eq!(balance_of(&pool, &user_id).await, 1);
        let transactions = ledger.list_transactions(&user_id).await.unwrap();
        assert!(transactions.iter().all(|t| t.kind != "usage"));
    }

    #[tokio::test]
    async fn test_concurrent_debits_spend_exactly_once() {
        let pool = setup_pool().await;
        let ledger = LedgerService::new(pool.clone());
        let user_id = create_user(&pool, "racer").await;
        ledger.grant_signup_credits(&user_id).await.unwrap();

        // Balance 1, cost 1, four simultaneous callers
        let mut handles = Vec::new();
        for _ in 0..4 {
            let ledger = ledger.clone();
            let user_id = user_id.clone();
            handles.push(tokio::spawn(async move {
                ledger.authorize_and_debit(&user_id, 1, "article").await
            }));
        }

        let mut successes = 0;
        let mut insufficient = 0;
        for handle in handles {
            match handle.await.expect("task join") {
                Ok(balance) => {
                    successes += 1;
                    assert_eq!(balance, 0);
                }
                Err(LedgerError::InsufficientCredits { .. }) => insufficient += 1,
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }

        assert_eq!(successes, 1, "exactly one concurrent debit may win");
        assert_eq!(insufficient, 3);
        assert_eq!(balance_of(&pool, &user_id).await, 0);

        // The log shows exactly one usage row
        let transactions = ledger.list_transactions(&user_id).await.unwrap();
        let usage_count = transactions.iter().filter(|t| t.kind == "usage").count();
        assert_eq!(usage_count, 1);
    }

    #[tokio::test]
    async fn test_purchase_records_single_transaction() {
        let pool = setup_pool().await;
        let ledger = LedgerService::new(pool.clone());
        let user_id = create_user(&pool, "buyer").await;

        let (balance, transaction) = ledger
            .record_purchase(&user_id, 50, 25, Some("pack"))
            .await
            .unwrap();

        assert_eq!(balance, 25);
        assert_eq!(transaction.amount, 25);
        assert_eq!(transaction.kind, "purchase");

        let transactions = ledger.list_transactions(&user_id).await.unwrap();
        let purchases: Vec<_> = transactions.iter().filter(|t| t.kind == "purchase").collect();
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].amount, 25);
    }

    #[tokio::test]
    async fn test_purchase_rejects_non_positive_amounts() {
        let pool = setup_pool().await;
        let ledger = LedgerService::new(pool.clone());
        let user_id = create_user(&pool, "cheap").await;

        let err = ledger
            .record_purchase(&user_id, 0, 25, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));

        let err = ledger
            .record_purchase(&user_id, 500, -5, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));

        let err = ledger.record_refund(&user_id, 0, None).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));

        // Nothing was recorded
        assert!(ledger.list_transactions(&user_id).await.unwrap().is_empty());
        assert_eq!(balance_of(&pool, &user_id).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let pool = setup_pool().await;
        let ledger = LedgerService::new(pool.clone());

        let err = ledger.get_entitlement("U_MISSING").await.unwrap_err();
        assert!(matches!(err, LedgerError::UserNotFound(_)));

        let err = ledger
            .authorize_and_debit("U_MISSING", 1, "article")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::UserNotFound(_)));

        let err = ledger
            .record_purchase("U_MISSING", 50, 25, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::UserNotFound(_)));

        let err = ledger.list_transactions("U_MISSING").await.unwrap_err();
        assert!(matches!(err, LedgerError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_link_provider_lowers_cost_and_unlink_restores_it() {
        let pool = setup_pool().await;
        let ledger = LedgerService::new(pool.clone());
        let user_id = create_user(&pool, "byok").await;

        let entitlement = ledger.get_entitlement(&user_id).await.unwrap();
        assert!(!entitlement.has_linked_provider);
        assert_eq!(LedgerService::cost_per_article(&entitlement), PLATFORM_RATE_CREDITS);

        let entitlement = ledger.link_provider(&user_id, "openai").await.unwrap();
        assert!(entitlement.has_linked_provider);
        assert_eq!(entitlement.provider.as_deref(), Some("openai"));
        assert_eq!(LedgerService::cost_per_article(&entitlement), BYOK_RATE_CREDITS);

        let entitlement = ledger.unlink_provider(&user_id).await.unwrap();
        assert!(!entitlement.has_linked_provider);
        assert!(entitlement.provider.is_none());
        assert_eq!(LedgerService::cost_per_article(&entitlement), PLATFORM_RATE_CREDITS);

        // Link state changes leave the ledger untouched
        assert!(ledger.list_transactions(&user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transactions_listed_in_append_order() {
        let pool = setup_pool().await;
        let ledger = LedgerService::new(pool.clone());
        let user_id = create_user(&pool, "audit").await;

        ledger.grant_signup_credits(&user_id).await.unwrap();
        ledger
            .record_purchase(&user_id, 100, 5, Some("pack"))
            .await
            .unwrap();
        ledger
            .authorize_and_debit(&user_id, 2, "article one")
            .await
            .unwrap();
        ledger
            .authorize_and_debit(&user_id, 2, "article two")
            .await
            .unwrap();

        let transactions = ledger.list_transactions(&user_id).await.unwrap();
        let kinds: Vec<&str> = transactions.iter().map(|t| t.kind.as_str()).collect();
        assert_eq!(kinds, vec!["purchase", "purchase", "usage", "usage"]);
        assert_eq!(
            transactions[2].description.as_deref(),
            Some("article one")
        );
        assert_eq!(
            transactions[3].description.as_deref(),
            Some("article two")
        );
    }

    #[tokio::test]
    async fn test_free_tier_cannot_afford_platform_article() {
        let pool = setup_pool().await;
        let ledger = LedgerService::new(pool.clone());
        let user_id = create_user(&pool, "freetier").await;
        ledger.grant_signup_credits(&user_id).await.unwrap();

        let entitlement = ledger.get_entitlement(&user_id).await.unwrap();
        let cost = LedgerService::cost_per_article(&entitlement);
        assert_eq!(cost, PLATFORM_RATE_CREDITS);
        assert!(!LedgerService::can_authorize(&entitlement, cost));

        let err = ledger
            .authorize_and_debit(&user_id, cost, "article")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientCredits { .. }));

        // After linking a provider the same balance covers the BYOK rate
        let entitlement = ledger.link_provider(&user_id, "openai").await.unwrap();
        let cost = LedgerService::cost_per_article(&entitlement);
        assert_eq!(cost, BYOK_RATE_CREDITS);
        let balance = ledger
            .authorize_and_debit(&user_id, cost, "article")
            .await
            .unwrap();
        assert_eq!(balance, 0);
    }
}
