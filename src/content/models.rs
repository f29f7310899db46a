// src/content/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Content Models
// ============================================================================

/// Lifecycle of a content artifact: created as a draft once the debit has
/// committed, then completed or failed by the generation outcome. A failed
/// generation keeps its debit; refunds are an explicit ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStatus {
    Draft,
    Completed,
    Failed,
}

impl ArtifactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactStatus::Draft => "draft",
            ArtifactStatus::Completed => "completed",
            ArtifactStatus::Failed => "failed",
        }
    }
}

#[derive(FromRow, Serialize, Deserialize, Debug)]
pub struct ContentItem {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>, // JSON string in DB, will be parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nlp_keywords: Option<String>, // JSON string in DB, will be parsed
    pub outline: Option<String>,
    pub content_type: String,
    pub ai_provider: String,
    pub status: String,
    pub credits_used: i64,
    pub created_at: Option<String>,
}

// Enhanced content response with parsed keyword arrays
#[derive(Serialize, Debug)]
pub struct ContentItemResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: Option<String>,
    pub keywords: Vec<String>,
    pub nlp_keywords: Vec<String>,
    pub outline: Option<String>,
    pub content_type: String,
    pub ai_provider: String,
    pub status: String,
    pub credits_used: i64,
    pub created_at: Option<String>,
}

impl From<ContentItem> for ContentItemResponse {
    fn from(item: ContentItem) -> Self {
        let keywords = item
            .keywords
            .and_then(|k| serde_json::from_str::<Vec<String>>(&k).ok())
            .unwrap_or_default();

        let nlp_keywords = item
            .nlp_keywords
            .and_then(|k| serde_json::from_str::<Vec<String>>(&k).ok())
            .unwrap_or_default();

        ContentItemResponse {
            id: item.id,
            user_id: item.user_id,
            title: item.title,
            content: item.content,
            keywords,
            nlp_keywords,
            outline: item.outline,
            content_type: item.content_type,
            ai_provider: item.ai_provider,
            status: item.status,
            credits_used: item.credits_used,
            created_at: item.created_at,
        }
    }
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Deserialize, Debug)]
pub struct GenerateContentRequest {
    pub topic: String,
    pub content_type: String,
    pub provider: String,
}

#[derive(Serialize, Debug)]
pub struct GenerateContentResponse {
    pub item: ContentItemResponse,
    pub balance: i64,
}

#[derive(Deserialize, Debug)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct BulkOperationResult {
    pub deleted: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

#[derive(Deserialize, Debug)]
pub struct TopicRequest {
    pub topic: String,
}

#[derive(Deserialize, Debug)]
pub struct NlpKeywordsRequest {
    pub content: String,
}

#[derive(Serialize, Debug)]
pub struct KeywordsResponse {
    pub keywords: Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct TitlesResponse {
    pub titles: Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct OutlineResponse {
    pub outline: String,
}
