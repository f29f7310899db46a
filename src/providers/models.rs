// src/providers/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored provider key. Key material is AES-GCM encrypted at rest and
/// never serialized back to clients.
#[derive(FromRow, Debug, Clone)]
pub struct ProviderKey {
    pub id: String,
    pub user_id: String,
    pub provider: String,
    pub encrypted_key: String,
    pub is_active: i64,
    pub created_at: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ProviderKeyResponse {
    pub id: String,
    pub provider: String,
    pub is_active: bool,
    pub created_at: Option<String>,
}

impl From<ProviderKey> for ProviderKeyResponse {
    fn from(key: ProviderKey) -> Self {
        ProviderKeyResponse {
            id: key.id,
            provider: key.provider,
            is_active: key.is_active != 0,
            created_at: key.created_at,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct LinkProviderRequest {
    pub provider: String,
    pub api_key: String,
}

#[derive(Serialize, Debug)]
pub struct ProviderLinkResponse {
    pub has_linked_provider: bool,
    pub provider: Option<String>,
    pub cost_per_article: i64,
}
