//! Tests for analytics module

#[cfg(test)]
mod tests {
    use crate::analytics::handlers::store_analytics_record;
    use crate::analytics::models::{AnalyticsRecord, AnalyticsRecordResponse, AnalyticsToolType};
    use crate::common::{generate_user_id, migrations};
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use std::str::FromStr;

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

    #[test]
    fn test_tool_type_tags_roundtrip() {
        let tools = [
            AnalyticsToolType::UserJourney,
            AnalyticsToolType::ContentPerformance,
            AnalyticsToolType::RevenueAttribution,
            AnalyticsToolType::CompetitorTraffic,
            AnalyticsToolType::SocialSentiment,
            AnalyticsToolType::TrendingTopics,
        ];

        for tool in tools {
            assert_eq!(AnalyticsToolType::parse(tool.as_str()), Some(tool));
        }

        assert_eq!(AnalyticsToolType::parse("unknown-tool"), None);
    }

    #[tokio::test]
    async fn test_records_are_scoped_to_their_user() {
        let pool = setup_pool().await;
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;

        let data = serde_json::json!({ "domain": "example.com" });
        let insights = serde_json::json!({ "estimated_monthly_traffic": 42000 });

        let id = store_analytics_record(
            &pool,
            &alice,
            AnalyticsToolType::CompetitorTraffic,
            &data,
            &insights,
        )
        .await
        .unwrap();
        assert!(id.starts_with("A_"));

        let alice_records: Vec<AnalyticsRecord> =
            sqlx::query_as("SELECT * FROM analytics_data WHERE user_id = ?")
                .bind(&alice)
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(alice_records.len(), 1);

        let bob_records: Vec<AnalyticsRecord> =
            sqlx::query_as("SELECT * FROM analytics_data WHERE user_id = ?")
                .bind(&bob)
                .fetch_all(&pool)
                .await
                .unwrap();
        assert!(bob_records.is_empty());

        let response: AnalyticsRecordResponse = alice_records.into_iter().next().unwrap().into();
        assert_eq!(response.tool_type, "competitor-traffic");
        assert_eq!(response.data, Some(data));
        assert_eq!(response.insights, Some(insights));
    }
}
