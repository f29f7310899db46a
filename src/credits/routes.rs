// src/credits/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Create the credits router with ledger-facing routes
pub fn credits_routes() -> Router {
    Router::new()
        .route("/api/credits", get(handlers::get_credit_summary))
        .route("/api/credits/transactions", get(handlers::list_transactions))
        .route("/api/credits/purchase", post(handlers::purchase_credits))
        .route("/api/credits/refund", post(handlers::refund_credits))
}
