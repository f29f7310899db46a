//! Tests for seo module
//!
//! These tests verify the closed tool-type tag set and the write-once
//! analysis record storage.

#[cfg(test)]
mod tests {
    use crate::common::{generate_user_id, migrations};
    use crate::seo::handlers::store_seo_analysis;
    use crate::seo::models::{SeoAnalysis, SeoAnalysisResponse, SeoToolType, ANALYSIS_SCHEMA_VERSION};
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
            SeoToolType::IntentMapping,
            SeoToolType::CompetitorDna,
            SeoToolType::VoiceSearch,
            SeoToolType::SerpFeatures,
            SeoToolType::SemanticWeb,
            SeoToolType::TrendingKeywords,
            SeoToolType::CompetitorGaps,
            SeoToolType::SerpOpportunities,
            SeoToolType::EatOptimization,
        ];

        for tool in tools {
            assert_eq!(SeoToolType::parse(tool.as_str()), Some(tool));
        }
    }

    #[test]
    fn test_tool_type_rejects_unknown_tags() {
        assert_eq!(SeoToolType::parse("made-up-tool"), None);
        assert_eq!(SeoToolType::parse(""), None);
        // Tags are exact, not case-folded
        assert_eq!(SeoToolType::parse("Intent-Mapping"), None);
    }

    #[tokio::test]
    async fn test_store_analysis_is_tagged_and_versioned() {
        let pool = setup_pool().await;
        let user_id = create_user(&pool, "analyst").await;

        let input = serde_json::json!({ "queries": ["best rust web framework"] });
        let results = serde_json::json!({ "results": [{ "intent": "consideration" }] });

        let id = store_seo_analysis(
            &pool,
            &user_id,
            SeoToolType::IntentMapping,
            &input,
            &results,
        )
        .await
        .unwrap();
        assert!(id.starts_with("S_"));

        let record: SeoAnalysis = sqlx::query_as("SELECT * FROM seo_analyses WHERE id = ?")
            .bind(&id)
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(record.user_id, user_id);
        assert_eq!(record.tool_type, "intent-mapping");
        assert_eq!(record.schema_version, ANALYSIS_SCHEMA_VERSION);

        let response: SeoAnalysisResponse = record.into();
        assert_eq!(response.input_data, Some(input));
        assert_eq!(response.results, Some(results));
    }
}
