// src/analytics/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Create the analytics tools router
pub fn analytics_routes() -> Router {
    Router::new()
        .route("/api/analytics/records", get(handlers::list_analytics_records))
        .route("/api/analytics/user-journey", post(handlers::user_journey))
        .route(
            "/api/analytics/content-performance",
            post(handlers::content_performance),
        )
        .route(
            "/api/analytics/revenue-attribution",
            post(handlers::revenue_attribution),
        )
        .route(
            "/api/analytics/competitor-traffic",
            post(handlers::competitor_traffic),
        )
        .route(
            "/api/analytics/social-sentiment",
            post(handlers::social_sentiment),
        )
        .route("/api/analytics/trending-topics", post(handlers::trending_topics))
}
