// src/seo/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Version stamped onto stored analysis payloads. Bump when the shape of
/// any tool's input or result JSON changes.
pub const ANALYSIS_SCHEMA_VERSION: i64 = 1;

/// Closed set of SEO tools. The tag is stored with each analysis record;
/// unknown strings are rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeoToolType {
    IntentMapping,
    CompetitorDna,
    VoiceSearch,
    SerpFeatures,
    SemanticWeb,
    TrendingKeywords,
    CompetitorGaps,
    SerpOpportunities,
    EatOptimization,
}

impl SeoToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeoToolType::IntentMapping => "intent-mapping",
            SeoToolType::CompetitorDna => "competitor-dna",
            SeoToolType::VoiceSearch => "voice-search",
            SeoToolType::SerpFeatures => "serp-features",
            SeoToolType::SemanticWeb => "semantic-web",
            SeoToolType::TrendingKeywords => "trending-keywords",
            SeoToolType::CompetitorGaps => "competitor-gaps",
            SeoToolType::SerpOpportunities => "serp-opportunities",
            SeoToolType::EatOptimization => "eat-optimization",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "intent-mapping" => Some(SeoToolType::IntentMapping),
            "competitor-dna" => Some(SeoToolType::CompetitorDna),
            "voice-search" => Some(SeoToolType::VoiceSearch),
            "serp-features" => Some(SeoToolType::SerpFeatures),
            "semantic-web" => Some(SeoToolType::SemanticWeb),
            "trending-keywords" => Some(SeoToolType::TrendingKeywords),
            "competitor-gaps" => Some(SeoToolType::CompetitorGaps),
            "serp-opportunities" => Some(SeoToolType::SerpOpportunities),
            "eat-optimization" => Some(SeoToolType::EatOptimization),
            _ => None,
        }
    }
}

/// Write-once analysis record; payloads are opaque JSON text tagged with a
/// schema version
#[derive(FromRow, Debug)]
pub struct SeoAnalysis {
    pub id: String,
    pub user_id: String,
    pub tool_type: String,
    pub input_data: Option<String>,
    pub results: Option<String>,
    pub schema_version: i64,
    pub created_at: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct SeoAnalysisResponse {
    pub id: String,
    pub tool_type: String,
    pub input_data: Option<serde_json::Value>,
    pub results: Option<serde_json::Value>,
    pub schema_version: i64,
    pub created_at: Option<String>,
}

impl From<SeoAnalysis> for SeoAnalysisResponse {
    fn from(record: SeoAnalysis) -> Self {
        SeoAnalysisResponse {
            id: record.id,
            tool_type: record.tool_type,
            input_data: record
                .input_data
                .and_then(|d| serde_json::from_str(&d).ok()),
            results: record.results.and_then(|r| serde_json::from_str(&r).ok()),
            schema_version: record.schema_version,
            created_at: record.created_at,
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize, Debug)]
pub struct IntentMappingRequest {
    pub queries: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct CompetitorDnaRequest {
    pub url: String,
    pub content: String,
}

#[derive(Deserialize, Debug)]
pub struct KeywordListRequest {
    pub keywords: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct SemanticWebRequest {
    pub keyword: String,
}

#[derive(Deserialize, Debug)]
pub struct TrendingKeywordsRequest {
    pub topic: String,
}

#[derive(Deserialize, Debug)]
pub struct CompetitorGapsRequest {
    pub domain: String,
    pub topic: String,
}

#[derive(Deserialize, Debug)]
pub struct EatOptimizationRequest {
    pub content: String,
    pub topic: String,
}
