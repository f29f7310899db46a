// src/content/handlers.rs

use axum::extract::{Extension, Json, Path};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::models::{
    ArtifactStatus, BulkDeleteRequest, BulkOperationResult, ContentItem, ContentItemResponse,
    GenerateContentRequest, GenerateContentResponse, KeywordsResponse, NlpKeywordsRequest,
    OutlineResponse, TitlesResponse, TopicRequest,
};
use super::validators::{BulkDeleteValidator, GenerateContentValidator};
use crate::auth::extractors::AuthedUser;
use crate::common::{generate_content_id, ApiError, AppState, Validator};
use crate::credits::ledger::LedgerService;
use crate::providers::handlers::active_decrypted_key;

/// POST /api/content/generate
///
/// The debit-gated generation flow: authorize and debit first, create the
/// draft artifact, then dispatch to the provider. A provider failure marks
/// the artifact failed and surfaces the error; the debit pays for the
/// attempt and stays committed.
pub async fn generate_content(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<GenerateContentRequest>,
) -> Result<Json<GenerateContentResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = GenerateContentValidator.validate(&body);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let provider = body.provider.to_lowercase();
    let topic = body.topic.trim().to_string();

    let entitlement = state.ledger.get_entitlement(&authed.id).await?;
    let cost = LedgerService::cost_per_article(&entitlement);

    let balance = state
        .ledger
        .authorize_and_debit(&authed.id, cost, &format!("article generation: {}", topic))
        .await?;

    let item_id = generate_content_id();
    let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

    sqlx::query(
        r#"INSERT INTO content_items (
            id, user_id, title, content, keywords, nlp_keywords, outline,
            content_type, ai_provider, status, credits_used, created_at
        ) VALUES (?, ?, ?, NULL, NULL, NULL, NULL, ?, ?, ?, ?, ?)"#,
    )
    .bind(&item_id)
    .bind(&authed.id)
    .bind(&topic)
    .bind(&body.content_type)
    .bind(&provider)
    .bind(ArtifactStatus::Draft.as_str())
    .bind(cost)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(
        user_id = %authed.id,
        item_id = %item_id,
        provider = %provider,
        cost = cost,
        "Generation authorized, draft created"
    );

    // BYOK users generate on their own key when it matches the provider
    let own_key = if entitlement.has_linked_provider
        && entitlement.provider.as_deref() == Some(provider.as_str())
    {
        active_decrypted_key(
            &state.db,
            state.encryption_service.as_ref(),
            &authed.id,
            &provider,
        )
        .await?
    } else {
        None
    };

    let generated = if provider == "perplexity" {
        state
            .perplexity_service
            .generate_article(&topic, &body.content_type, own_key.as_deref())
            .await
            .map_err(ApiError::from)
    } else {
        state
            .openai_service
            .generate_article(&topic, &body.content_type, own_key.as_deref())
            .await
            .map_err(ApiError::from)
    };

    let article = match generated {
        Ok(article) => article,
        Err(e) => {
            // Debit stands: the artifact records the failed attempt
            warn!(
                item_id = %item_id,
                provider = %provider,
                error = %e,
                "Generation failed after debit"
            );
            sqlx::query("UPDATE content_items SET status = ? WHERE id = ?")
                .bind(ArtifactStatus::Failed.as_str())
                .bind(&item_id)
                .execute(&state.db)
                .await
                .map_err(ApiError::DatabaseError)?;
            return Err(e);
        }
    };

    // NLP keyword extraction is best-effort enrichment; its failure does
    // not fail the artifact
    let nlp_keywords = match state.openai_service.extract_nlp_keywords(&article).await {
        Ok(keywords) => keywords,
        Err(e) => {
            warn!(item_id = %item_id, error = %e, "NLP keyword extraction skipped");
            Vec::new()
        }
    };

    let nlp_keywords_json =
        serde_json::to_string(&nlp_keywords).unwrap_or_else(|_| "[]".to_string());

    sqlx::query(
        "UPDATE content_items SET content = ?, nlp_keywords = ?, status = ? WHERE id = ?",
    )
    .bind(&article)
    .bind(&nlp_keywords_json)
    .bind(ArtifactStatus::Completed.as_str())
    .bind(&item_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let item: ContentItem = sqlx::query_as("SELECT * FROM content_items WHERE id = ?")
        .bind(&item_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        user_id = %authed.id,
        item_id = %item_id,
        "Article generation completed"
    );

    Ok(Json(GenerateContentResponse {
        item: item.into(),
        balance,
    }))
}

/// GET /api/content
/// The user's artifacts, newest first
pub async fn list_content(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<ContentItemResponse>>, ApiError> {
    let state = state_lock.read().await.clone();

    let items: Vec<ContentItem> = sqlx::query_as(
        "SELECT * FROM content_items WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
    )
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(items.into_iter().map(Into::into).collect()))
}

/// GET /api/content/:id
pub async fn get_content_by_id(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<ContentItemResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    // Ownership is part of the lookup; other users' artifacts are invisible
    let item: Option<ContentItem> =
        sqlx::query_as("SELECT * FROM content_items WHERE id = ? AND user_id = ?")
            .bind(&id)
            .bind(&authed.id)
            .fetch_optional(&state.db)
            .await
            .map_err(ApiError::DatabaseError)?;

    match item {
        Some(item) => Ok(Json(item.into())),
        None => Err(ApiError::NotFound("content not found".to_string())),
    }
}

/// DELETE /api/content/:id
pub async fn delete_content(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM content_items WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&authed.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("content not found".to_string()));
    }

    info!(user_id = %authed.id, item_id = %id, "Content deleted");

    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST /api/content/bulk-delete
/// Per-id result reporting: one unknown id fails that id, not the batch
pub async fn bulk_delete_content(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<BulkDeleteRequest>,
) -> Result<Json<BulkOperationResult>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = BulkDeleteValidator.validate(&body);
    if !validation.is_valid {
        return Err(validation.into());
    }

    info!(
        user_id = %authed.id,
        item_count = body.ids.len(),
        "Starting bulk content deletion"
    );

    let result = bulk_delete_items(&state.db, &authed.id, &body.ids).await?;

    Ok(Json(result))
}

/// Delete each id individually, reporting per-id failures
pub async fn bulk_delete_items(
    db: &SqlitePool,
    user_id: &str,
    ids: &[String],
) -> Result<BulkOperationResult, ApiError> {
    let mut deleted = 0;
    let mut failed = 0;
    let mut errors = Vec::new();

    for id in ids {
        let result = sqlx::query("DELETE FROM content_items WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await;

        match result {
            Ok(r) if r.rows_affected() > 0 => deleted += 1,
            Ok(_) => {
                failed += 1;
                errors.push(format!("Content {} not found", id));
            }
            Err(e) => {
                error!(item_id = %id, error = %e, "Bulk delete failed for item");
                failed += 1;
                errors.push(format!("Failed to delete {}", id));
            }
        }
    }

    Ok(BulkOperationResult {
        deleted,
        failed,
        errors,
    })
}

// ============================================================================
// Free generation helpers (no debit, mirrors the original tooling)
// ============================================================================

/// POST /api/generate/keywords
pub async fn generate_keywords(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Json(body): Json<TopicRequest>,
) -> Result<Json<KeywordsResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.topic.trim().is_empty() {
        return Err(ApiError::BadRequest("topic is required".to_string()));
    }

    let keywords = state.openai_service.generate_keywords(&body.topic).await?;

    Ok(Json(KeywordsResponse { keywords }))
}

/// POST /api/generate/titles
pub async fn generate_titles(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Json(body): Json<TopicRequest>,
) -> Result<Json<TitlesResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.topic.trim().is_empty() {
        return Err(ApiError::BadRequest("topic is required".to_string()));
    }

    let titles = state.openai_service.generate_titles(&body.topic).await?;

    Ok(Json(TitlesResponse { titles }))
}

/// POST /api/generate/outline
pub async fn generate_outline(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Json(body): Json<TopicRequest>,
) -> Result<Json<OutlineResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.topic.trim().is_empty() {
        return Err(ApiError::BadRequest("topic is required".to_string()));
    }

    let outline = state.openai_service.generate_outline(&body.topic).await?;

    Ok(Json(OutlineResponse { outline }))
}

/// POST /api/generate/nlp-keywords
pub async fn extract_nlp_keywords(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
    Json(body): Json<NlpKeywordsRequest>,
) -> Result<Json<KeywordsResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    if body.content.trim().is_empty() {
        return Err(ApiError::BadRequest("content is required".to_string()));
    }

    let keywords = state
        .openai_service
        .extract_nlp_keywords(&body.content)
        .await?;

    Ok(Json(KeywordsResponse { keywords }))
}
