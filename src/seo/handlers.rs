// src/seo/handlers.rs

use axum::extract::{Extension, Json};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::{
    CompetitorDnaRequest, CompetitorGapsRequest, EatOptimizationRequest, IntentMappingRequest,
    KeywordListRequest, SemanticWebRequest, SeoAnalysis, SeoAnalysisResponse, SeoToolType,
    TrendingKeywordsRequest, ANALYSIS_SCHEMA_VERSION,
};
use crate::auth::extractors::AuthedUser;
use crate::common::{generate_seo_analysis_id, ApiError, AppState};

/// Persist one write-once analysis record
pub async fn store_seo_analysis(
    db: &SqlitePool,
    user_id: &str,
    tool_type: SeoToolType,
    input_data: &serde_json::Value,
    results: &serde_json::Value,
) -> Result<String, ApiError> {
    let id = generate_seo_analysis_id();
    let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

    sqlx::query(
        r#"INSERT INTO seo_analyses (id, user_id, tool_type, input_data, results, schema_version, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(tool_type.as_str())
    .bind(input_data.to_string())
    .bind(results.to_string())
    .bind(ANALYSIS_SCHEMA_VERSION)
    .bind(&now)
    .execute(db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(
        user_id = %user_id,
        analysis_id = %id,
        tool = tool_type.as_str(),
        "SEO analysis stored"
    );

    Ok(id)
}

/// GET /api/seo/analyses
/// The user's analysis history, newest first
pub async fn list_seo_analyses(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<SeoAnalysisResponse>>, ApiError> {
    let state = state_lock.read().await.clone();

    let records: Vec<SeoAnalysis> = sqlx::query_as(
        "SELECT * FROM seo_analyses WHERE user_id = ? ORDER BY rowid DESC",
    )
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// POST /api/seo/intent-mapping
pub async fn intent_mapping(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<IntentMappingRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.queries.is_empty() {
        return Err(ApiError::BadRequest("queries must not be empty".to_string()));
    }

    let results = state
        .seo_toolkit
        .analyze_intent_mapping(&body.queries)
        .await?;

    store_seo_analysis(
        &state.db,
        &authed.id,
        SeoToolType::IntentMapping,
        &serde_json::json!({ "queries": body.queries }),
        &results,
    )
    .await?;

    Ok(Json(results))
}

/// POST /api/seo/competitor-dna
pub async fn competitor_dna(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<CompetitorDnaRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.url.trim().is_empty() || body.content.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "url and content are required".to_string(),
        ));
    }

    let results = state
        .seo_toolkit
        .analyze_competitor_dna(&body.url, &body.content)
        .await?;

    store_seo_analysis(
        &state.db,
        &authed.id,
        SeoToolType::CompetitorDna,
        &serde_json::json!({ "url": body.url, "content": body.content }),
        &results,
    )
    .await?;

    Ok(Json(results))
}

/// POST /api/seo/voice-search
pub async fn voice_search(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<KeywordListRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.keywords.is_empty() {
        return Err(ApiError::BadRequest("keywords must not be empty".to_string()));
    }

    let results = state
        .seo_toolkit
        .optimize_for_voice_search(&body.keywords)
        .await?;

    store_seo_analysis(
        &state.db,
        &authed.id,
        SeoToolType::VoiceSearch,
        &serde_json::json!({ "keywords": body.keywords }),
        &results,
    )
    .await?;

    Ok(Json(results))
}

/// POST /api/seo/serp-features
pub async fn serp_features(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<KeywordListRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.keywords.is_empty() {
        return Err(ApiError::BadRequest("keywords must not be empty".to_string()));
    }

    let results = state
        .seo_toolkit
        .predict_serp_features(&body.keywords)
        .await?;

    store_seo_analysis(
        &state.db,
        &authed.id,
        SeoToolType::SerpFeatures,
        &serde_json::json!({ "keywords": body.keywords }),
        &results,
    )
    .await?;

    Ok(Json(results))
}

/// POST /api/seo/semantic-web
pub async fn semantic_web(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<SemanticWebRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.keyword.trim().is_empty() {
        return Err(ApiError::BadRequest("keyword is required".to_string()));
    }

    let results = state
        .seo_toolkit
        .create_semantic_keyword_web(&body.keyword)
        .await?;

    store_seo_analysis(
        &state.db,
        &authed.id,
        SeoToolType::SemanticWeb,
        &serde_json::json!({ "keyword": body.keyword }),
        &results,
    )
    .await?;

    Ok(Json(results))
}

/// POST /api/seo/trending-keywords
pub async fn trending_keywords(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<TrendingKeywordsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.topic.trim().is_empty() {
        return Err(ApiError::BadRequest("topic is required".to_string()));
    }

    let keywords = state
        .perplexity_service
        .generate_trending_keywords(&body.topic)
        .await?;
    let results = serde_json::json!({ "keywords": keywords });

    store_seo_analysis(
        &state.db,
        &authed.id,
        SeoToolType::TrendingKeywords,
        &serde_json::json!({ "topic": body.topic }),
        &results,
    )
    .await?;

    Ok(Json(results))
}

/// POST /api/seo/competitor-gaps
pub async fn competitor_gaps(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<CompetitorGapsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.domain.trim().is_empty() || body.topic.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "domain and topic are required".to_string(),
        ));
    }

    let results = state
        .perplexity_service
        .analyze_competitor_gaps(&body.domain, &body.topic)
        .await?;

    store_seo_analysis(
        &state.db,
        &authed.id,
        SeoToolType::CompetitorGaps,
        &serde_json::json!({ "domain": body.domain, "topic": body.topic }),
        &results,
    )
    .await?;

    Ok(Json(results))
}

/// POST /api/seo/serp-opportunities
pub async fn serp_opportunities(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<KeywordListRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.keywords.is_empty() {
        return Err(ApiError::BadRequest("keywords must not be empty".to_string()));
    }

    let results = state
        .perplexity_service
        .find_serp_opportunities(&body.keywords)
        .await?;

    store_seo_analysis(
        &state.db,
        &authed.id,
        SeoToolType::SerpOpportunities,
        &serde_json::json!({ "keywords": body.keywords }),
        &results,
    )
    .await?;

    Ok(Json(results))
}

/// POST /api/seo/eat-optimization
pub async fn eat_optimization(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<EatOptimizationRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.content.trim().is_empty() || body.topic.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "content and topic are required".to_string(),
        ));
    }

    let results = state
        .perplexity_service
        .optimize_for_eat(&body.content, &body.topic)
        .await?;

    store_seo_analysis(
        &state.db,
        &authed.id,
        SeoToolType::EatOptimization,
        &serde_json::json!({ "content": body.content, "topic": body.topic }),
        &results,
    )
    .await?;

    Ok(Json(results))
}
