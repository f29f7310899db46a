// src/analytics/handlers.rs

use axum::extract::{Extension, Json};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::{
    AnalyticsRecord, AnalyticsRecordResponse, AnalyticsToolType, CompetitorTrafficRequest,
    ContentPerformanceRequest, RevenueAttributionRequest, SocialSentimentRequest,
    TrendingTopicsRequest, UserJourneyRequest,
};
use crate::auth::extractors::AuthedUser;
use crate::common::{generate_analytics_id, ApiError, AppState};
use crate::seo::models::ANALYSIS_SCHEMA_VERSION;

/// Persist one write-once analytics record
pub async fn store_analytics_record(
    db: &SqlitePool,
    user_id: &str,
    tool_type: AnalyticsToolType,
    data: &serde_json::Value,
    insights: &serde_json::Value,
) -> Result<String, ApiError> {
    let id = generate_analytics_id();
    let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

    sqlx::query(
        r#"INSERT INTO analytics_data (id, user_id, tool_type, data, insights, schema_version, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(tool_type.as_str())
    .bind(data.to_string())
    .bind(insights.to_string())
    .bind(ANALYSIS_SCHEMA_VERSION)
    .bind(&now)
    .execute(db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(
        user_id = %user_id,
        record_id = %id,
        tool = tool_type.as_str(),
        "Analytics record stored"
    );

    Ok(id)
}

/// GET /api/analytics/records
pub async fn list_analytics_records(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<AnalyticsRecordResponse>>, ApiError> {
    let state = state_lock.read().await.clone();

    let records: Vec<AnalyticsRecord> = sqlx::query_as(
        "SELECT * FROM analytics_data WHERE user_id = ? ORDER BY rowid DESC",
    )
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// POST /api/analytics/user-journey
pub async fn user_journey(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<UserJourneyRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.behavior_data.is_null() {
        return Err(ApiError::BadRequest("behavior_data is required".to_string()));
    }

    let insights = state
        .analytics_toolkit
        .analyze_user_journey(&body.behavior_data)
        .await?;

    store_analytics_record(
        &state.db,
        &authed.id,
        AnalyticsToolType::UserJourney,
        &body.behavior_data,
        &insights,
    )
    .await?;

    Ok(Json(insights))
}

/// POST /api/analytics/content-performance
pub async fn content_performance(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<ContentPerformanceRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.content_data.is_null() {
        return Err(ApiError::BadRequest("content_data is required".to_string()));
    }

    let insights = state
        .analytics_toolkit
        .predict_content_performance(&body.content_data)
        .await?;

    store_analytics_record(
        &state.db,
        &authed.id,
        AnalyticsToolType::ContentPerformance,
        &body.content_data,
        &insights,
    )
    .await?;

    Ok(Json(insights))
}

/// POST /api/analytics/revenue-attribution
pub async fn revenue_attribution(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<RevenueAttributionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.conversion_data.is_null() {
        return Err(ApiError::BadRequest(
            "conversion_data is required".to_string(),
        ));
    }

    let insights = state
        .analytics_toolkit
        .track_revenue_attribution(&body.conversion_data)
        .await?;

    store_analytics_record(
        &state.db,
        &authed.id,
        AnalyticsToolType::RevenueAttribution,
        &body.conversion_data,
        &insights,
    )
    .await?;

    Ok(Json(insights))
}

/// POST /api/analytics/competitor-traffic
pub async fn competitor_traffic(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<CompetitorTrafficRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.domain.trim().is_empty() {
        return Err(ApiError::BadRequest("domain is required".to_string()));
    }

    let insights = state
        .analytics_toolkit
        .estimate_competitor_traffic(&body.domain)
        .await?;

    store_analytics_record(
        &state.db,
        &authed.id,
        AnalyticsToolType::CompetitorTraffic,
        &serde_json::json!({ "domain": body.domain }),
        &insights,
    )
    .await?;

    Ok(Json(insights))
}

/// POST /api/analytics/social-sentiment
pub async fn social_sentiment(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<SocialSentimentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.social_data.is_null() || body.performance_data.is_null() {
        return Err(ApiError::BadRequest(
            "social_data and performance_data are required".to_string(),
        ));
    }

    let insights = state
        .analytics_toolkit
        .correlate_social_sentiment(&body.social_data, &body.performance_data)
        .await?;

    store_analytics_record(
        &state.db,
        &authed.id,
        AnalyticsToolType::SocialSentiment,
        &serde_json::json!({
            "social_data": body.social_data,
            "performance_data": body.performance_data,
        }),
        &insights,
    )
    .await?;

    Ok(Json(insights))
}

/// POST /api/analytics/trending-topics
pub async fn trending_topics(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<TrendingTopicsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.industry.trim().is_empty() {
        return Err(ApiError::BadRequest("industry is required".to_string()));
    }

    let insights = state
        .perplexity_service
        .analyze_trending_topics(&body.industry)
        .await?;

    store_analytics_record(
        &state.db,
        &authed.id,
        AnalyticsToolType::TrendingTopics,
        &serde_json::json!({ "industry": body.industry }),
        &insights,
    )
    .await?;

    Ok(Json(insights))
}
