// src/credits/handlers.rs

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::ledger::LedgerService;
use super::models::{
    BalanceChangeResponse, CreditSummaryResponse, CreditTransaction, PurchaseRequest,
    RefundRequest,
};
use crate::auth::extractors::AuthedUser;
use crate::common::{ApiError, AppState};

/// GET /api/credits
/// Current balance, provider-link state, and the cost of the next article
pub async fn get_credit_summary(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<CreditSummaryResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let entitlement = state.ledger.get_entitlement(&authed.id).await?;
    let cost_per_article = LedgerService::cost_per_article(&entitlement);

    Ok(Json(CreditSummaryResponse {
        balance: entitlement.balance,
        has_linked_provider: entitlement.has_linked_provider,
        provider: entitlement.provider,
        cost_per_article,
    }))
}

/// GET /api/credits/transactions
/// The user's full transaction log in append order
pub async fn list_transactions(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<CreditTransaction>>, ApiError> {
    let state = state_lock.read().await.clone();

    let transactions = state.ledger.list_transactions(&authed.id).await?;

    Ok(Json(transactions))
}

/// POST /api/credits/purchase
/// Record a completed credit-pack purchase and increase the balance
pub async fn purchase_credits(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<PurchaseRequest>,
) -> Result<Json<BalanceChangeResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let (balance, transaction) = state
        .ledger
        .record_purchase(
            &authed.id,
            body.amount_cents,
            body.credits,
            body.description.as_deref(),
        )
        .await?;

    info!(
        user_id = %authed.id,
        credits = body.credits,
        amount_cents = body.amount_cents,
        "Credit purchase recorded"
    );

    Ok(Json(BalanceChangeResponse {
        balance,
        transaction,
    }))
}

/// POST /api/credits/refund
/// Admin-only: append an explicit refund for a user. Generation debits are
/// never rolled back automatically, so this is the only path back.
pub async fn refund_credits(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(body): Json<RefundRequest>,
) -> Result<Json<BalanceChangeResponse>, ApiError> {
    if !authed.is_admin {
        warn!(
            user_id = %authed.id,
            "Refund denied: admin privileges required"
        );
        return Err(ApiError::Forbidden("admin privileges required".to_string()));
    }

    let state = state_lock.read().await.clone();

    let (balance, transaction) = state
        .ledger
        .record_refund(&body.user_id, body.credits, body.description.as_deref())
        .await?;

    info!(
        admin_user_id = %authed.id,
        user_id = %body.user_id,
        credits = body.credits,
        "Refund recorded"
    );

    Ok(Json(BalanceChangeResponse {
        balance,
        transaction,
    }))
}
