// src/seo/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Create the SEO tools router
pub fn seo_routes() -> Router {
    Router::new()
        .route("/api/seo/analyses", get(handlers::list_seo_analyses))
        // OpenAI-backed tools
        .route("/api/seo/intent-mapping", post(handlers::intent_mapping))
        .route("/api/seo/competitor-dna", post(handlers::competitor_dna))
        .route("/api/seo/voice-search", post(handlers::voice_search))
        .route("/api/seo/serp-features", post(handlers::serp_features))
        .route("/api/seo/semantic-web", post(handlers::semantic_web))
        // Perplexity-backed research tools
        .route("/api/seo/trending-keywords", post(handlers::trending_keywords))
        .route("/api/seo/competitor-gaps", post(handlers::competitor_gaps))
        .route(
            "/api/seo/serp-opportunities",
            post(handlers::serp_opportunities),
        )
        .route("/api/seo/eat-optimization", post(handlers::eat_optimization))
}
