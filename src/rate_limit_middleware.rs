// rate_limit_middleware.rs
use crate::services::rate_limit::{RateLimitResult, RateLimitService};
use axum::{
    extract::{ConnectInfo, Extension, Request},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Serialize)]
struct RateLimitErrorResponse {
    error: String,
    code: String,
    retry_after: u32,
}

/// Extract IP address from request
fn extract_ip_address(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> Option<String> {
    // X-Forwarded-For first (for proxied requests), first IP in the chain
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                return Some(first_ip.trim().to_string());
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    connect_info.map(|info| info.0.ip().to_string())
}

/// Extract a stable identifier from the Authorization header
fn extract_user_identifier(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| {
            auth.strip_prefix("Bearer ")
                .map(|token| format!("token:{}", &token[..token.len().min(20)]))
        })
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    Extension(rate_limit_service): Extension<Arc<RateLimitService>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let headers = request.headers().clone();

    let ip_address = extract_ip_address(&headers, connect_info.as_ref());

    let user_identifier = extract_user_identifier(&headers);
    let is_authenticated = user_identifier.is_some();

    // Fall back to the IP as identifier when no token is present
    let identifier = user_identifier
        .or_else(|| ip_address.clone().map(|ip| format!("anon:{}", ip)))
        .unwrap_or_else(|| "unknown".to_string());

    let path = request.uri().path().to_string();

    match rate_limit_service
        .check_rate_limit(&identifier, ip_address.as_deref(), is_authenticated)
        .await
    {
        Ok(RateLimitResult::Allowed) => {
            debug!(
                identifier = %identifier,
                ip = ?ip_address,
                path = %path,
                "Request allowed by rate limiter"
            );
            Ok(next.run(request).await)
        }
        Ok(RateLimitResult::Limited { retry_after }) => {
            rate_limit_service
                .log_violation(&identifier, ip_address.as_deref(), &path)
                .await;

            let error_response = RateLimitErrorResponse {
                error: "Rate limit exceeded. Please try again later.".to_string(),
                code: "RATE_LIMIT_EXCEEDED".to_string(),
                retry_after,
            };

            let mut response =
                (StatusCode::TOO_MANY_REQUESTS, Json(error_response)).into_response();

            if let Ok(retry_header) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert("retry-after", retry_header);
            }

            Err(response)
        }
        Err(e) => {
            warn!(
                error = %e,
                identifier = %identifier,
                "Error checking rate limit, allowing request"
            );
            Ok(next.run(request).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn test_extract_ip_from_x_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.1, 198.51.100.1".parse().unwrap(),
        );

        let ip = extract_ip_address(&headers, None);
        assert_eq!(ip, Some("203.0.113.1".to_string()));
    }

    #[test]
    fn test_extract_ip_from_x_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.7".parse().unwrap());

        let ip = extract_ip_address(&headers, None);
        assert_eq!(ip, Some("198.51.100.7".to_string()));
    }

    #[test]
    fn test_extract_user_identifier_requires_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer abc123token".parse().unwrap());
        assert_eq!(
            extract_user_identifier(&headers),
            Some("token:abc123token".to_string())
        );

        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Basic abc123".parse().unwrap());
        assert_eq!(extract_user_identifier(&headers), None);
    }
}
