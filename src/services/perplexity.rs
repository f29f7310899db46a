// src/services/perplexity.rs
//! Perplexity sonar proxy. Used for article generation with real-time web
//! data and for the research-flavored SEO tools.

use crate::services::settings::SettingsService;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

#[derive(Debug, thiserror::Error)]
pub enum PerplexityError {
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
pub struct PerplexityConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
struct SonarRequest {
    model: String,
    messages: Vec<SonarMessage>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    stream: bool,
    search_recency_filter: String,
    return_images: bool,
    return_related_questions: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SonarMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct SonarResponse {
    #[serde(default)]
    choices: Vec<SonarChoice>,
}

#[derive(Debug, Deserialize)]
struct SonarChoice {
    message: SonarMessage,
}

#[derive(Debug)]
pub struct PerplexityService {
    settings_service: Arc<SettingsService>,
    client: Client,
}

impl PerplexityService {
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

    /// Get Perplexity configuration from settings
    pub async fn get_config(&self) -> Result<PerplexityConfig, PerplexityError> {
        let api_key = self
            .settings_service
            .get_setting("perplexity_api_key")
            .await
            .map_err(|e| PerplexityError::SettingsError(e.to_string()))?
            .ok_or(PerplexityError::NotConfigured)?;

        let base_url = self
            .settings_service
            .get_setting_or("perplexity_base_url", "https://api.perplexity.ai")
            .await
            .map_err(|e| PerplexityError::SettingsError(e.to_string()))?;

        let model = self
            .settings_service
            .get_setting_or("perplexity_model", "llama-3.1-sonar-small-128k-online")
            .await
            .map_err(|e| PerplexityError::SettingsError(e.to_string()))?;

        Ok(PerplexityConfig {
            api_key,
            base_url,
            model,
        })
    }

    /// Generate an article with current web context folded in
    pub async fn generate_article(
        &self,
        topic: &str,
        content_type: &str,
        api_key_override: Option<&str>,
    ) -> Result<String, PerplexityError> {
        let system = "You are an expert content writer with access to real-time web data. \
                      Create comprehensive, well-researched content that incorporates the \
                      latest information and trends.";
        let prompt = format!(
            "Create a high-quality {} about \"{}\". Include recent developments, \
             current trends, and cite credible sources. Make it engaging, informative, \
             and SEO-optimized with proper structure and headings.",
            content_type, topic
        );

        self.chat(system, &prompt, 0.7, 3000, api_key_override).await
    }

    /// Trending keyword research based on current search patterns
    pub async fn generate_trending_keywords(
        &self,
        topic: &str,
    ) -> Result<Vec<String>, PerplexityError> {
        let system = "You are an SEO expert with access to real-time search data. \
                      Provide trending keywords based on current search patterns.";
        let prompt = format!(
            "Research and provide 20 trending keywords related to \"{}\" based on \
             current search trends, user intent, and market demand. Focus on \
             high-potential, low-competition keywords. \
             Return as a JSON array of strings only.",
            topic
        );

        let content = self.chat(system, &prompt, 0.3, 2000, None).await?;

        // The model usually honors the JSON instruction; fall back to lines
        // when it narrates instead
        match serde_json::from_str::<Vec<String>>(content.trim()) {
            Ok(keywords) => Ok(keywords),
            Err(_) => {
                warn!("Perplexity returned non-JSON keyword list, splitting lines");
                Ok(content
                    .lines()
                    .map(|l| l.trim_start_matches(['-', '*', ' ']).trim().to_string())
                    .filter(|l| !l.is_empty())
                    .take(20)
                    .collect())
            }
        }
    }

    /// Content-gap analysis against a competitor domain
    pub async fn analyze_competitor_gaps(
        &self,
        domain: &str,
        topic: &str,
    ) -> Result<serde_json::Value, PerplexityError> {
        let system = "You are a competitive SEO analyst with access to real-time web data.";
        let prompt = format!(
            "Analyze the content coverage of {} around the topic \"{}\". Identify \
             content gaps: subtopics, question formats, and keyword clusters the \
             domain does not cover well, and rank them by opportunity.",
            domain, topic
        );

        let analysis = self.chat(system, &prompt, 0.2, 2000, None).await?;

        Ok(serde_json::json!({
            "domain": domain,
            "topic": topic,
            "analysis": analysis,
        }))
    }

    /// SERP opportunity discovery for a keyword set
    pub async fn find_serp_opportunities(
        &self,
        keywords: &[String],
    ) -> Result<serde_json::Value, PerplexityError> {
        let system = "You are an SEO strategist with access to real-time search results.";
        let prompt = format!(
            "For these keywords: {}. Identify current SERP opportunities: weak \
             featured snippets, thin top results, unanswered People-Also-Ask \
             questions, and ranking difficulty. Summarize per keyword.",
            keywords.join(", ")
        );

        let opportunities = self.chat(system, &prompt, 0.2, 2000, None).await?;

        Ok(serde_json::json!({
            "keywords": keywords,
            "opportunities": opportunities,
        }))
    }

    /// E-E-A-T optimization guidance for existing content
    pub async fn optimize_for_eat(
        &self,
        content: &str,
        topic: &str,
    ) -> Result<serde_json::Value, PerplexityError> {
        let system = "You are an SEO quality rater familiar with E-E-A-T guidelines.";
        let prompt = format!(
            "Evaluate this content about \"{}\" against experience, expertise, \
             authoritativeness, and trustworthiness. Suggest concrete improvements \
             and credible sources to cite.\n\nContent:\n{}",
            topic, content
        );

        let optimization = self.chat(system, &prompt, 0.2, 2000, None).await?;

        Ok(serde_json::json!({
            "topic": topic,
            "optimization": optimization,
        }))
    }

    /// Trending topic scan for an industry
    pub async fn analyze_trending_topics(
        &self,
        industry: &str,
    ) -> Result<serde_json::Value, PerplexityError> {
        let system = "You are a market researcher with access to real-time web data.";
        let prompt = format!(
            "What topics are currently trending in the {} industry? List the top \
             themes with a short rationale and content angle for each.",
            industry
        );

        let analysis = self.chat(system, &prompt, 0.3, 2000, None).await?;

        Ok(serde_json::json!({
            "industry": industry,
            "analysis": analysis,
        }))
    }

    async fn chat(
        &self,
        system: &str,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
        api_key_override: Option<&str>,
    ) -> Result<String, PerplexityError> {
        let config = self.get_config().await?;
        let api_key = api_key_override.unwrap_or(&config.api_key);

        let request = SonarRequest {
            model: config.model.clone(),
            messages: vec![
                SonarMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                SonarMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature,
            top_p: 0.9,
            max_tokens,
            stream: false,
            search_recency_filter: "month".to_string(),
            return_images: false,
            return_related_questions: false,
        };

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );

        debug!(model = %request.model, "Dispatching Perplexity chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP error contacting Perplexity");
                PerplexityError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            warn!("Perplexity rate limit hit");
            return Err(PerplexityError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(http_status = %status, "Perplexity returned error status");
            return Err(PerplexityError::RequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let parsed: SonarResponse = response.json().await.map_err(|e| {
            PerplexityError::InvalidResponse(format!("malformed completion response: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PerplexityError::InvalidResponse("no choices in response".to_string()))
    }
}
