// src/providers/routes.rs

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Create the providers router for BYOK key management
pub fn providers_routes() -> Router {
    Router::new()
        .route("/api/providers", get(handlers::list_provider_keys))
        .route(
            "/api/providers/link",
            post(handlers::link_provider).delete(handlers::unlink_provider),
        )
}
