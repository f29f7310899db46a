// src/content/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Create the content router with artifact and generation routes
pub fn content_routes() -> Router {
    Router::new()
        // Debit-gated article generation
        .route("/api/content/generate", post(handlers::generate_content))
        // Artifact management
        .route("/api/content", get(handlers::list_content))
        .route("/api/content/bulk-delete", post(handlers::bulk_delete_content))
        .route(
            "/api/content/:id",
            get(handlers::get_content_by_id).delete(handlers::delete_content),
        )
        // Free generation helpers
        .route("/api/generate/keywords", post(handlers::generate_keywords))
        .route("/api/generate/titles", post(handlers::generate_titles))
        .route("/api/generate/outline", post(handlers::generate_outline))
        .route(
            "/api/generate/nlp-keywords",
            post(handlers::extract_nlp_keywords),
        )
}
