// src/services/openai.rs
use crate::services::settings::SettingsService;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

#[derive(Debug, thiserror::Error)]
pub enum OpenAIError {
    #[error("API key not configured")]
    NotConfigured,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Settings error: {0}")]
    SettingsError(String),
}

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// What a text generation call is for; tunes sampling per purpose
#[derive(Debug, Clone, Copy)]
pub enum TextGenerationPurpose {
    ArticleGeneration,
    OutlineDrafting,
}

impl TextGenerationPurpose {
    fn temperature(&self) -> f32 {
        match self {
            TextGenerationPurpose::ArticleGeneration => 0.7,
            TextGenerationPurpose::OutlineDrafting => 0.5,
        }
    }

    fn max_tokens(&self) -> u32 {
        match self {
            TextGenerationPurpose::ArticleGeneration => 2000,
            TextGenerationPurpose::OutlineDrafting => 1200,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Thin proxy to the OpenAI chat-completions API. Resolves key and model
/// through SettingsService; callers with a linked provider key pass their
/// own key to shift inference cost off the platform.
#[derive(Debug)]
pub struct OpenAIService {
    settings_service: Arc<SettingsService>,
    client: Client,
}

impl OpenAIService {
    pub fn new(settings_service: Arc<SettingsService>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(180))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            settings_service,
            client,
        }
    }

    /// Get OpenAI configuration from settings
    pub async fn get_config(&self) -> Result<OpenAIConfig, OpenAIError> {
        let api_key = self
            .settings_service
            .get_setting("openai_api_key")
            .await
            .map_err(|e| OpenAIError::SettingsError(e.to_string()))?
            .ok_or(OpenAIError::NotConfigured)?;

        let base_url = self
            .settings_service
            .get_setting_or("openai_base_url", "https://api.openai.com")
            .await
            .map_err(|e| OpenAIError::SettingsError(e.to_string()))?;

        let model = self
            .settings_service
            .get_setting_or("openai_model", "gpt-4o")
            .await
            .map_err(|e| OpenAIError::SettingsError(e.to_string()))?;

        Ok(OpenAIConfig {
            api_key,
            base_url,
            model,
        })
    }

    /// Generate an SEO-oriented article body
    pub async fn generate_article(
        &self,
        topic: &str,
        content_type: &str,
        api_key_override: Option<&str>,
    ) -> Result<String, OpenAIError> {
        let prompt = format!(
            "Generate high-quality {} content about \"{}\". \
             Make it engaging, informative, and SEO-optimized. \
             Include relevant headings and structure.",
            content_type, topic
        );

        self.chat_text(
            None,
            &prompt,
            TextGenerationPurpose::ArticleGeneration,
            api_key_override,
        )
        .await
    }

    /// Generate SEO keywords for a topic
    pub async fn generate_keywords(&self, topic: &str) -> Result<Vec<String>, OpenAIError> {
        let prompt = format!(
            "Generate 20 relevant SEO keywords for the topic \"{}\". \
             Return a JSON object with a \"keywords\" array of strings.",
            topic
        );

        let result = self
            .chat_json("You are an SEO expert. Respond with JSON format only.", &prompt)
            .await?;

        Ok(extract_string_array(&result, "keywords"))
    }

    /// Generate compelling title candidates for a topic
    pub async fn generate_titles(&self, topic: &str) -> Result<Vec<String>, OpenAIError> {
        let prompt = format!(
            "Generate 10 compelling, SEO-optimized titles for content about \"{}\". \
             Return a JSON object with a \"titles\" array of strings.",
            topic
        );

        let result = self
            .chat_json("You are an SEO expert. Respond with JSON format only.", &prompt)
            .await?;

        Ok(extract_string_array(&result, "titles"))
    }

    /// Draft a content outline for a topic
    pub async fn generate_outline(&self, topic: &str) -> Result<String, OpenAIError> {
        let prompt = format!(
            "Create a detailed content outline for \"{}\". \
             Include main headings, subheadings, and key points to cover.",
            topic
        );

        self.chat_text(None, &prompt, TextGenerationPurpose::OutlineDrafting, None)
            .await
    }

    /// Extract the most important NLP keywords and semantic terms from content
    pub async fn extract_nlp_keywords(&self, content: &str) -> Result<Vec<String>, OpenAIError> {
        let prompt = format!(
            "Analyze this content and extract the most important NLP keywords \
             and semantic terms: \"{}\". \
             Return a JSON object with a \"keywords\" array of strings.",
            content
        );

        let result = self
            .chat_json("You are an NLP expert. Respond with JSON format only.", &prompt)
            .await?;

        Ok(extract_string_array(&result, "keywords"))
    }

    /// Run an analysis prompt and return the raw JSON object the model
    /// produced. The SEO and analytics toolkits build on this primitive.
    pub async fn analyze_json(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<serde_json::Value, OpenAIError> {
        self.chat_json(system, prompt).await
    }

    /// Free-form text completion
    async fn chat_text(
        &self,
        system: Option<&str>,
        prompt: &str,
        purpose: TextGenerationPurpose,
        api_key_override: Option<&str>,
    ) -> Result<String, OpenAIError> {
        let config = self.get_config().await?;
        let api_key = api_key_override.unwrap_or(&config.api_key);

        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        let request = ChatCompletionRequest {
            model: config.model.clone(),
            messages,
            temperature: Some(purpose.temperature()),
            max_tokens: Some(purpose.max_tokens()),
            response_format: None,
        };

        self.execute(&config.base_url, api_key, &request).await
    }

    /// JSON-mode completion; the model is instructed to emit a single object
    async fn chat_json(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<serde_json::Value, OpenAIError> {
        let config = self.get_config().await?;

        let request = ChatCompletionRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: None,
            max_tokens: None,
            response_format: Some(serde_json::json!({ "type": "json_object" })),
        };

        let content = self.execute(&config.base_url, &config.api_key, &request).await?;

        serde_json::from_str(&content).map_err(|e| {
            warn!(error = %e, "Model returned non-JSON content in JSON mode");
            OpenAIError::InvalidResponse(format!("expected JSON object: {}", e))
        })
    }

    async fn execute(
        &self,
        base_url: &str,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<String, OpenAIError> {
        let url = format!("{}/v1/chat/completions", base_url.trim_end_matches('/'));

        debug!(model = %request.model, "Dispatching OpenAI chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP error contacting OpenAI");
                OpenAIError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            warn!("OpenAI rate limit hit");
            return Err(OpenAIError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(http_status = %status, "OpenAI returned error status");
            return Err(OpenAIError::RequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            OpenAIError::InvalidResponse(format!("malformed completion response: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OpenAIError::InvalidResponse("no choices in response".to_string()))
    }
}

/// Pull a string array out of a model-produced JSON object, tolerating a
/// bare top-level array as well
fn extract_string_array(value: &serde_json::Value, key: &str) -> Vec<String> {
    let array = value
        .get(key)
        .and_then(|v| v.as_array())
        .or_else(|| value.as_array());

    array
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_string_array_from_object() {
        let value = serde_json::json!({ "keywords": ["rust", "sqlite", 42] });
        assert_eq!(
            extract_string_array(&value, "keywords"),
            vec!["rust".to_string(), "sqlite".to_string()]
        );
    }

    #[test]
    fn test_extract_string_array_from_bare_array() {
        let value = serde_json::json!(["one", "two"]);
        assert_eq!(
            extract_string_array(&value, "keywords"),
            vec!["one".to_string(), "two".to_string()]
        );
    }

    #[test]
    fn test_extract_string_array_missing_key() {
        let value = serde_json::json!({ "other": true });
        assert!(extract_string_array(&value, "keywords").is_empty());
    }

    #[test]
    fn test_purpose_tuning() {
        assert!(
            TextGenerationPurpose::ArticleGeneration.max_tokens()
                > TextGenerationPurpose::OutlineDrafting.max_tokens()
        );
    }
}
