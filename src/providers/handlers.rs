// src/providers/handlers.rs

use axum::extract::{Extension, Json};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::models::{
    LinkProviderRequest, ProviderKey, ProviderKeyResponse, ProviderLinkResponse,
};
use crate::auth::extractors::AuthedUser;
use crate::common::{generate_provider_key_id, safe_token_log, ApiError, AppState};
use crate::content::validators::SUPPORTED_PROVIDERS;
use crate::credits::ledger::LedgerService;
use crate::services::encryption::EncryptionService;

const MIN_API_KEY_LENGTH: usize = 8;

/// GET /api/providers
/// Metadata for the user's stored keys; key material never leaves the server
pub async fn list_provider_keys(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<ProviderKeyResponse>>, ApiError> {
    let state = state_lock.read().await.clone();

    let keys: Vec<ProviderKey> = sqlx::query_as(
        "SELECT * FROM provider_keys WHERE user_id = ? ORDER BY rowid ASC",
    )
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(keys.into_iter().map(Into::into).collect()))
}

/// POST /api/providers/link
/// Store the key encrypted, then flip the entitlement flag through the
/// ledger so the per-article cost drops
pub async fn link_provider(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<LinkProviderRequest>,
) -> Result<Json<ProviderLinkResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let provider = body.provider.to_lowercase();
    if !SUPPORTED_PROVIDERS.contains(&provider.as_str()) {
        return Err(ApiError::BadRequest(
            "provider must be one of: openai, perplexity".to_string(),
        ));
    }

    let api_key = body.api_key.trim();
    if api_key.len() < MIN_API_KEY_LENGTH {
        return Err(ApiError::BadRequest(
            "api_key looks too short to be valid".to_string(),
        ));
    }

    let encryption = state.encryption_service.as_ref().ok_or_else(|| {
        warn!("Provider key link rejected: encryption not configured");
        ApiError::ServiceUnavailable(
            "provider key storage requires ENCRYPTION_MASTER_KEY".to_string(),
        )
    })?;

    let encrypted_key = encryption.encrypt(api_key).map_err(|e| {
        ApiError::InternalServer(format!("failed to encrypt provider key: {}", e))
    })?;

    // A user holds at most one active key; older ones are retired, not
    // deleted, to keep an audit trail
    sqlx::query("UPDATE provider_keys SET is_active = 0 WHERE user_id = ?")
        .bind(&authed.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let key_id = generate_provider_key_id();
    let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

    sqlx::query(
        r#"INSERT INTO provider_keys (id, user_id, provider, encrypted_key, is_active, created_at)
           VALUES (?, ?, ?, ?, 1, ?)"#,
    )
    .bind(&key_id)
    .bind(&authed.id)
    .bind(&provider)
    .bind(&encrypted_key)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let entitlement = state.ledger.link_provider(&authed.id, &provider).await?;

    info!(
        user_id = %authed.id,
        provider = %provider,
        key = %safe_token_log(api_key),
        "Provider key linked"
    );

    let cost_per_article = LedgerService::cost_per_article(&entitlement);
    Ok(Json(ProviderLinkResponse {
        has_linked_provider: entitlement.has_linked_provider,
        provider: entitlement.provider,
        cost_per_article,
    }))
}

/// DELETE /api/providers/link
/// Retire the stored keys and clear the entitlement flag
pub async fn unlink_provider(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<ProviderLinkResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    sqlx::query("UPDATE provider_keys SET is_active = 0 WHERE user_id = ?")
        .bind(&authed.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let entitlement = state.ledger.unlink_provider(&authed.id).await?;

    info!(user_id = %authed.id, "Provider unlinked");

    let cost_per_article = LedgerService::cost_per_article(&entitlement);
    Ok(Json(ProviderLinkResponse {
        has_linked_provider: entitlement.has_linked_provider,
        provider: entitlement.provider,
        cost_per_article,
    }))
}

/// Decrypted key material for the user's active key on a provider, if any.
/// Used by the generation flow to run BYOK inference on the user's key.
pub(crate) async fn active_decrypted_key(
    db: &SqlitePool,
    encryption: Option<&Arc<EncryptionService>>,
    user_id: &str,
    provider: &str,
) -> Result<Option<String>, ApiError> {
    let key: Option<ProviderKey> = sqlx::query_as(
        "SELECT * FROM provider_keys
         WHERE user_id = ? AND provider = ? AND is_active = 1
         ORDER BY rowid DESC LIMIT 1",
    )
    .bind(user_id)
    .bind(provider)
    .fetch_optional(db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let Some(key) = key else {
        return Ok(None);
    };

    let Some(encryption) = encryption else {
        warn!(
            user_id = %user_id,
            "Stored provider key unreadable without encryption service, using platform key"
        );
        return Ok(None);
    };

    match encryption.decrypt(&key.encrypted_key) {
        Ok(plaintext) => Ok(Some(plaintext)),
        Err(e) => {
            warn!(
                user_id = %user_id,
                key_id = %key.id,
                error = %e,
                "Failed to decrypt provider key, using platform key"
            );
            Ok(None)
        }
    }
}
