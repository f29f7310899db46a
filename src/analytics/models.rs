// src/analytics/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Closed set of analytics tools; same tagging discipline as the SEO tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsToolType {
    UserJourney,
    ContentPerformance,
    RevenueAttribution,
    CompetitorTraffic,
    SocialSentiment,
    TrendingTopics,
}

impl AnalyticsToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsToolType::UserJourney => "user-journey",
            AnalyticsToolType::ContentPerformance => "content-performance",
            AnalyticsToolType::RevenueAttribution => "revenue-attribution",
            AnalyticsToolType::CompetitorTraffic => "competitor-traffic",
            AnalyticsToolType::SocialSentiment => "social-sentiment",
            AnalyticsToolType::TrendingTopics => "trending-topics",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user-journey" => Some(AnalyticsToolType::UserJourney),
            "content-performance" => Some(AnalyticsToolType::ContentPerformance),
            "revenue-attribution" => Some(AnalyticsToolType::RevenueAttribution),
            "competitor-traffic" => Some(AnalyticsToolType::CompetitorTraffic),
            "social-sentiment" => Some(AnalyticsToolType::SocialSentiment),
            "trending-topics" => Some(AnalyticsToolType::TrendingTopics),
            _ => None,
        }
    }
}

/// Write-once analytics record: input data plus the derived insights
#[derive(FromRow, Debug)]
pub struct AnalyticsRecord {
    pub id: String,
    pub user_id: String,
    pub tool_type: String,
    pub data: Option<String>,
    pub insights: Option<String>,
    pub schema_version: i64,
    pub created_at: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct AnalyticsRecordResponse {
    pub id: String,
    pub tool_type: String,
    pub data: Option<serde_json::Value>,
    pub insights: Option<serde_json::Value>,
    pub schema_version: i64,
    pub created_at: Option<String>,
}

impl From<AnalyticsRecord> for AnalyticsRecordResponse {
    fn from(record: AnalyticsRecord) -> Self {
        AnalyticsRecordResponse {
            id: record.id,
            tool_type: record.tool_type,
            data: record.data.and_then(|d| serde_json::from_str(&d).ok()),
            insights: record.insights.and_then(|i| serde_json::from_str(&i).ok()),
            schema_version: record.schema_version,
            created_at: record.created_at,
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize, Debug)]
pub struct UserJourneyRequest {
    pub behavior_data: serde_json::Value,
}

#[derive(Deserialize, Debug)]
pub struct ContentPerformanceRequest {
    pub content_data: serde_json::Value,
}

#[derive(Deserialize, Debug)]
pub struct RevenueAttributionRequest {
    pub conversion_data: serde_json::Value,
}

#[derive(Deserialize, Debug)]
pub struct CompetitorTrafficRequest {
    pub domain: String,
}

#[derive(Deserialize, Debug)]
pub struct SocialSentimentRequest {
    pub social_data: serde_json::Value,
    pub performance_data: serde_json::Value,
}

#[derive(Deserialize, Debug)]
pub struct TrendingTopicsRequest {
    pub industry: String,
}
