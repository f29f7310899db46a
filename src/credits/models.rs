// src/credits/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Ledger Models
// ============================================================================

/// Kind of a credit transaction. The ledger only knows these three events;
/// the free-tier signup grant is recorded as a zero-cost purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Purchase,
    Usage,
    Refund,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Purchase => "purchase",
            TransactionKind::Usage => "usage",
            TransactionKind::Refund => "refund",
        }
    }
}

/// A single immutable ledger entry. Amounts are signed: positive for
/// purchase/refund, negative for usage.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct CreditTransaction {
    pub id: String,
    pub user_id: String,
    pub amount: i64,
    pub kind: String,
    pub description: Option<String>,
    pub created_at: Option<String>,
}

/// Snapshot of a user's balance and provider-link state, the input to
/// cost computation and authorization checks
#[derive(Debug, Clone, Serialize)]
pub struct Entitlement {
    pub user_id: String,
    pub balance: i64,
    pub has_linked_provider: bool,
    pub provider: Option<String>,
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize, Debug)]
pub struct CreditSummaryResponse {
    pub balance: i64,
    pub has_linked_provider: bool,
    pub provider: Option<String>,
    pub cost_per_article: i64,
}

#[derive(Deserialize, Debug)]
pub struct PurchaseRequest {
    /// Amount paid, in cents, as reported by the payment flow
    pub amount_cents: i64,
    /// Credits granted by the purchased pack
    pub credits: i64,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct RefundRequest {
    pub user_id: String,
    pub credits: i64,
    pub description: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct BalanceChangeResponse {
    pub balance: i64,
    pub transaction: CreditTransaction,
}
