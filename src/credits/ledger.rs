// src/credits/ledger.rs
//! Credit ledger and entitlement service.
//!
//! Single source of truth for user balances and the append-only transaction
//! log. All balance changes go through this service; no other module writes
//! the `credits` column or `credit_transactions` rows.
//!
//! Atomicity: every balance change runs inside a database transaction whose
//! debit statement carries the balance guard in its WHERE clause, so a
//! concurrent check-then-update interleaving cannot over-debit a user.

use sqlx::SqlitePool;
use tracing::{info, warn};

use super::models::{CreditTransaction, Entitlement, TransactionKind};
use crate::common::generate_transaction_id;

/// Credits debited per article when the user generates on platform keys
pub const PLATFORM_RATE_CREDITS: i64 = 2;

/// Credits debited per article when the user has linked their own provider
/// key (inference cost is theirs, so the platform charges less)
pub const BYOK_RATE_CREDITS: i64 = 1;

/// Credits granted at signup (free tier: one platform article is out of
/// reach, one BYOK article is not)
pub const SIGNUP_GRANT_CREDITS: i64 = 1;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("insufficient credits: balance {balance}, cost {cost}")]
    InsufficientCredits { balance: i64, cost: i64 },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct LedgerService {
    db: SqlitePool,
}

impl LedgerService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Current balance and provider-link state for a user
    pub async fn get_entitlement(&self, user_id: &str) -> Result<Entitlement, LedgerError> {
        let row: Option<(i64, i64, Option<String>)> = sqlx::query_as(
            "SELECT credits, has_linked_provider, provider_name FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some((balance, linked, provider)) => Ok(Entitlement {
                user_id: user_id.to_string(),
                balance,
                has_linked_provider: linked != 0,
                provider,
            }),
            None => Err(LedgerError::UserNotFound(user_id.to_string())),
        }
    }

    /// Cost of the next article for this entitlement. Pure: same input,
    /// same answer, no side effects.
    pub fn cost_per_article(entitlement: &Entitlement) -> i64 {
        if entitlement.has_linked_provider {
            BYOK_RATE_CREDITS
        } else {
            PLATFORM_RATE_CREDITS
        }
    }

    /// Whether a debit of `cost` is permitted. Balance must cover the cost
    /// for every user class; linking a provider lowers the cost rather than
    /// bypassing the check, so no debit can drive a balance negative.
    pub fn can_authorize(entitlement: &Entitlement, cost: i64) -> bool {
        entitlement.balance >= cost
    }

    /// Atomically authorize and debit `cost` credits from a user, appending
    /// a `usage` transaction. Returns the updated balance.
    ///
    /// The balance guard lives in the UPDATE's WHERE clause; concurrent
    /// calls for the same user serialize on the write transaction, so with
    /// balance 1 and cost 1 exactly one of N simultaneous callers succeeds.
    pub async fn authorize_and_debit(
        &self,
        user_id: &str,
        cost: i64,
        description: &str,
    ) -> Result<i64, LedgerError> {
        if cost <= 0 {
            return Err(LedgerError::InvalidAmount(format!(
                "debit cost must be positive, got {}",
                cost
            )));
        }

        let mut tx = self.db.begin().await?;

        let updated = sqlx::query(
            "UPDATE users SET credits = credits - ? WHERE id = ? AND credits >= ?",
        )
        .bind(cost)
        .bind(user_id)
        .bind(cost)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // Disambiguate inside the same transaction: missing user vs
            // balance below cost
            let row: Option<(i64,)> = sqlx::query_as("SELECT credits FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;

            return match row {
                None => Err(LedgerError::UserNotFound(user_id.to_string())),
                Some((balance,)) => {
                    warn!(
                        user_id = %user_id,
                        balance = balance,
                        cost = cost,
                        "Debit denied: insufficient credits"
                    );
                    Err(LedgerError::InsufficientCredits { balance, cost })
                }
            };
        }

        append_transaction(&mut tx, user_id, -cost, TransactionKind::Usage, Some(description))
            .await?;

        let (balance,): (i64,) = sqlx::query_as("SELECT credits FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            cost = cost,
            balance = balance,
            "Credits debited"
        );

        Ok(balance)
    }

    /// Record a credit-pack purchase: appends a `purchase` transaction of
    /// `+credits` and increases the balance by the same delta.
    pub async fn record_purchase(
        &self,
        user_id: &str,
        amount_cents: i64,
        credits: i64,
        description: Option<&str>,
    ) -> Result<(i64, CreditTransaction), LedgerError> {
        if amount_cents <= 0 {
            return Err(LedgerError::InvalidAmount(format!(
                "purchase amount must be positive, got {} cents",
                amount_cents
            )));
        }

        self.credit_user(user_id, credits, TransactionKind::Purchase, description)
            .await
    }

    /// Record an explicit refund: appends a `refund` transaction of
    /// `+credits`. Debits are never rolled back implicitly; this is the
    /// only way credits come back.
    pub async fn record_refund(
        &self,
        user_id: &str,
        credits: i64,
        description: Option<&str>,
    ) -> Result<(i64, CreditTransaction), LedgerError> {
        self.credit_user(user_id, credits, TransactionKind::Refund, description)
            .await
    }

    /// Record the free-tier signup grant so the transaction log reconciles
    /// with the balance from the very first event
    pub async fn grant_signup_credits(&self, user_id: &str) -> Result<(), LedgerError> {
        self.credit_user(
            user_id,
            SIGNUP_GRANT_CREDITS,
            TransactionKind::Purchase,
            Some("free tier signup credit"),
        )
        .await?;

        Ok(())
    }

    async fn credit_user(
        &self,
        user_id: &str,
        credits: i64,
        kind: TransactionKind,
        description: Option<&str>,
    ) -> Result<(i64, CreditTransaction), LedgerError> {
        if credits <= 0 {
            return Err(LedgerError::InvalidAmount(format!(
                "credit amount must be positive, got {}",
                credits
            )));
        }

        let mut tx = self.db.begin().await?;

        let updated = sqlx::query("UPDATE users SET credits = credits + ? WHERE id = ?")
            .bind(credits)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(LedgerError::UserNotFound(user_id.to_string()));
        }

        let transaction =
            append_transaction(&mut tx, user_id, credits, kind, description).await?;

        let (balance,): (i64,) = sqlx::query_as("SELECT credits FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            credits = credits,
            kind = kind.as_str(),
            balance = balance,
            "Credits added"
        );

        Ok((balance, transaction))
    }

    /// Set the provider-link flag and provider name. No balance effect;
    /// only future cost computation changes.
    pub async fn link_provider(
        &self,
        user_id: &str,
        provider: &str,
    ) -> Result<Entitlement, LedgerError> {
        let updated = sqlx::query(
            "UPDATE users SET has_linked_provider = 1, provider_name = ? WHERE id = ?",
        )
        .bind(provider)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(LedgerError::UserNotFound(user_id.to_string()));
        }

        self.get_entitlement(user_id).await
    }

    /// Clear the provider-link flag and provider name
    pub async fn unlink_provider(&self, user_id: &str) -> Result<Entitlement, LedgerError> {
        let updated = sqlx::query(
            "UPDATE users SET has_linked_provider = 0, provider_name = NULL WHERE id = ?",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(LedgerError::UserNotFound(user_id.to_string()));
        }

        self.get_entitlement(user_id).await
    }

    /// All transactions for a user in append order
    pub async fn list_transactions(
        &self,
        user_id: &str,
    ) -> Result<Vec<CreditTransaction>, LedgerError> {
        // Existence check first so an unknown user is a NotFound, not an
        // empty list
        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;

        if exists.is_none() {
            return Err(LedgerError::UserNotFound(user_id.to_string()));
        }

        // rowid preserves insertion order regardless of timestamp granularity
        let transactions = sqlx::query_as::<_, CreditTransaction>(
            "SELECT id, user_id, amount, kind, description, created_at
             FROM credit_transactions WHERE user_id = ? ORDER BY rowid ASC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(transactions)
    }
}

/// Append one immutable ledger row inside an open transaction
async fn append_transaction(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    user_id: &str,
    amount: i64,
    kind: TransactionKind,
    description: Option<&str>,
) -> Result<CreditTransaction, LedgerError> {
    let id = generate_transaction_id();
    let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

    sqlx::query(
        r#"INSERT INTO credit_transactions (id, user_id, amount, kind, description, created_at)
           VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(amount)
    .bind(kind.as_str())
    .bind(description)
    .bind(&now)
    .execute(&mut **tx)
    .await?;

    Ok(CreditTransaction {
        id,
        user_id: user_id.to_string(),
        amount,
        kind: kind.as_str().to_string(),
        description: description.map(str::to_string),
        created_at: Some(now),
    })
}
