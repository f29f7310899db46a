// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::ValidationResult;
use crate::credits::ledger::LedgerError;
use crate::services::openai::OpenAIError;
use crate::services::perplexity::PerplexityError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    InsufficientCredits(String),
    InvalidAmount(String),
    Conflict(String),
    InternalServer(String),
    ServiceUnavailable(String),
    DatabaseError(sqlx::Error),
    ValidationError(String),
    ProviderError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::InsufficientCredits(msg) => write!(f, "Insufficient Credits: {}", msg),
            ApiError::InvalidAmount(msg) => write!(f, "Invalid Amount: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service Unavailable: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::ProviderError(msg) => write!(f, "Provider Error: {}", msg),
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message, code) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, "FORBIDDEN"),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            ApiError::InsufficientCredits(msg) => {
                (StatusCode::PAYMENT_REQUIRED, msg, "INSUFFICIENT_CREDITS")
            }
            ApiError::InvalidAmount(msg) => (StatusCode::BAD_REQUEST, msg, "INVALID_AMOUNT"),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, "CONFLICT"),
            ApiError::InternalServer(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg,
                "INTERNAL_SERVER_ERROR",
            ),
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                msg,
                "SERVICE_UNAVAILABLE",
            ),
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR"),
            ApiError::ProviderError(msg) => (StatusCode::BAD_GATEWAY, msg, "PROVIDER_ERROR"),
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ApiError::ValidationError(error_messages.join(", "))
        }
    }
}

impl From<OpenAIError> for ApiError {
    fn from(err: OpenAIError) -> Self {
        match err {
            OpenAIError::NotConfigured => {
                ApiError::ServiceUnavailable("OpenAI API key not configured".to_string())
            }
            OpenAIError::RateLimitExceeded => {
                ApiError::ServiceUnavailable("OpenAI rate limit exceeded".to_string())
            }
            other => ApiError::ProviderError(other.to_string()),
        }
    }
}

impl From<PerplexityError> for ApiError {
    fn from(err: PerplexityError) -> Self {
        match err {
            PerplexityError::NotConfigured => {
                ApiError::ServiceUnavailable("Perplexity API key not configured".to_string())
            }
            PerplexityError::RateLimitExceeded => {
                ApiError::ServiceUnavailable("Perplexity rate limit exceeded".to_string())
            }
            other => ApiError::ProviderError(other.to_string()),
        }
    }
}

/// Ledger errors map onto the API taxonomy one-to-one
impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UserNotFound(id) => ApiError::NotFound(format!("user {} not found", id)),
            LedgerError::InsufficientCredits { balance, cost } => ApiError::InsufficientCredits(
                format!("balance {} does not cover cost {}", balance, cost),
            ),
            LedgerError::InvalidAmount(msg) => ApiError::InvalidAmount(msg),
            LedgerError::Database(e) => ApiError::DatabaseError(e),
        }
    }
}
