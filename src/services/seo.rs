// src/services/seo.rs
//! OpenAI-backed SEO analysis tools. Each method returns the raw JSON
//! object the model produced; results are persisted opaquely by the seo
//! module with a schema version tag.

use crate::services::openai::{OpenAIError, OpenAIService};
use std::sync::Arc;

#[derive(Debug)]
pub struct SeoToolkit {
    openai: Arc<OpenAIService>,
}

impl SeoToolkit {
    pub fn new(openai: Arc<OpenAIService>) -> Self {
        Self { openai }
    }

    /// Classify search queries into intent stages and surface content gaps
    pub async fn analyze_intent_mapping(
        &self,
        queries: &[String],
    ) -> Result<serde_json::Value, OpenAIError> {
        let prompt = format!(
            "Analyze these search queries and determine user intent stages \
             (awareness, consideration, decision). For each query, provide intent \
             classification, a confidence score between 0 and 1, and content gaps.\n\
             Queries: {}\n\n\
             Return a JSON object: {{\"results\": [{{\"query\": string, \
             \"intent\": \"awareness|consideration|decision\", \"confidence\": number, \
             \"content_gaps\": [string]}}]}}",
            queries.join(", ")
        );

        self.openai
            .analyze_json(
                "You are an expert SEO analyst specializing in search intent analysis.",
                &prompt,
            )
            .await
    }

    /// Break down the content patterns of a competitor page
    pub async fn analyze_competitor_dna(
        &self,
        url: &str,
        content: &str,
    ) -> Result<serde_json::Value, OpenAIError> {
        let prompt = format!(
            "Analyze the writing patterns of this competitor page ({}). Identify \
             recurring word patterns, semantic clusters, content depth (0-100), and \
             structural elements.\n\nContent:\n{}\n\n\
             Return a JSON object: {{\"url\": string, \"word_patterns\": [string], \
             \"semantic_clusters\": [string], \"content_depth\": number, \
             \"structure\": [string]}}",
            url, content
        );

        self.openai
            .analyze_json(
                "You are an expert SEO content analyst. Respond with JSON format only.",
                &prompt,
            )
            .await
    }

    /// Rework keywords into conversational, voice-search-friendly variants
    pub async fn optimize_for_voice_search(
        &self,
        keywords: &[String],
    ) -> Result<serde_json::Value, OpenAIError> {
        let prompt = format!(
            "For each of these keywords, produce conversational voice-search \
             variants, a featured-snippet potential score between 0 and 1, and a \
             short voice-optimized answer.\nKeywords: {}\n\n\
             Return a JSON object: {{\"results\": [{{\"original_keyword\": string, \
             \"conversational_variants\": [string], \"featured_snippet_potential\": \
             number, \"voice_optimized_content\": string}}]}}",
            keywords.join(", ")
        );

        self.openai
            .analyze_json(
                "You are an expert in voice search optimization. Respond with JSON format only.",
                &prompt,
            )
            .await
    }

    /// Predict which SERP features each keyword can win
    pub async fn predict_serp_features(
        &self,
        keywords: &[String],
    ) -> Result<serde_json::Value, OpenAIError> {
        let prompt = format!(
            "For each keyword, estimate the likelihood (0-1) of winning these SERP \
             features: featured snippet, people-also-ask, image results, video \
             results, local results. Add actionable recommendations.\n\
             Keywords: {}\n\n\
             Return a JSON object: {{\"results\": [{{\"keyword\": string, \
             \"featured_snippet\": number, \"people_also_ask\": number, \
             \"image_results\": number, \"video_results\": number, \
             \"local_results\": number, \"recommendations\": [string]}}]}}",
            keywords.join(", ")
        );

        self.openai
            .analyze_json(
                "You are an expert SERP analyst. Respond with JSON format only.",
                &prompt,
            )
            .await
    }

    /// Build a semantic web of related terms and topic clusters
    pub async fn create_semantic_keyword_web(
        &self,
        keyword: &str,
    ) -> Result<serde_json::Value, OpenAIError> {
        let prompt = format!(
            "Build a semantic keyword web for \"{}\". Include related terms with \
             relationship type and strength (0-1), plus topic clusters with their \
             keywords and relevance scores.\n\n\
             Return a JSON object: {{\"primary_keyword\": string, \
             \"related_terms\": [{{\"term\": string, \"relationship\": string, \
             \"strength\": number}}], \"topic_clusters\": [{{\"cluster\": string, \
             \"keywords\": [string], \"relevance\": number}}]}}",
            keyword
        );

        self.openai
            .analyze_json(
                "You are an expert in semantic SEO. Respond with JSON format only.",
                &prompt,
            )
            .await
    }
}
