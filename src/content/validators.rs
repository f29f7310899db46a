// src/content/validators.rs

use super::models::{BulkDeleteRequest, GenerateContentRequest};
use crate::common::{ValidationResult, Validator};

pub const SUPPORTED_PROVIDERS: &[&str] = &["openai", "perplexity"];

const MAX_TOPIC_LENGTH: usize = 200;
const MAX_CONTENT_TYPE_LENGTH: usize = 64;
const MAX_BULK_DELETE_IDS: usize = 100;

// ============================================================================
// Content Validators
// ============================================================================

pub struct GenerateContentValidator;

impl Validator<GenerateContentRequest> for GenerateContentValidator {
    fn validate(&self, data: &GenerateContentRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        // Validate topic
        if data.topic.trim().is_empty() {
            result.add_error("topic", "Topic is required");
        } else if data.topic.len() > MAX_TOPIC_LENGTH {
            result.add_error("topic", "Topic must be less than 200 characters");
        }

        // Validate content type
        if data.content_type.trim().is_empty() {
            result.add_error("content_type", "Content type is required");
        } else if data.content_type.len() > MAX_CONTENT_TYPE_LENGTH {
            result.add_error("content_type", "Content type must be less than 64 characters");
        }

        // Validate provider
        if !SUPPORTED_PROVIDERS.contains(&data.provider.to_lowercase().as_str()) {
            result.add_error(
                "provider",
                "Provider must be one of: openai, perplexity",
            );
        }

        result
    }
}

pub struct BulkDeleteValidator;

impl Validator<BulkDeleteRequest> for BulkDeleteValidator {
    fn validate(&self, data: &BulkDeleteRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.ids.is_empty() {
            result.add_error("ids", "At least one content ID is required");
        } else if data.ids.len() > MAX_BULK_DELETE_IDS {
            result.add_error("ids", "Cannot delete more than 100 items at once");
        }

        if data.ids.iter().any(|id| id.trim().is_empty()) {
            result.add_error("ids", "Content IDs must not be empty");
        }

        result
    }
}
