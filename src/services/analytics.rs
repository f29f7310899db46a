// src/services/analytics.rs
//! OpenAI-backed analytics tools: LLM-derived estimates and insights over
//! caller-supplied data. Outputs are model estimates, not measurements.

use crate::services::openai::{OpenAIError, OpenAIService};
use std::sync::Arc;

#[derive(Debug)]
pub struct AnalyticsToolkit {
    openai: Arc<OpenAIService>,
}

impl AnalyticsToolkit {
    pub fn new(openai: Arc<OpenAIService>) -> Self {
        Self { openai }
    }

    /// Reconstruct a user journey from behavior data
    pub async fn analyze_user_journey(
        &self,
        behavior_data: &serde_json::Value,
    ) -> Result<serde_json::Value, OpenAIError> {
        let prompt = format!(
            "Analyze this user behavior data and reconstruct the customer journey: \
             stages with touchpoints, conversion rates, and drop-off reasons.\n\
             Data: {}\n\n\
             Return a JSON object: {{\"stages\": [{{\"stage\": string, \
             \"touchpoints\": [string], \"conversion_rate\": number, \
             \"dropoff_reasons\": [string]}}]}}",
            behavior_data
        );

        self.openai
            .analyze_json(
                "You are an expert conversion analyst. Respond with JSON format only.",
                &prompt,
            )
            .await
    }

    /// Predict how a piece of content will perform
    pub async fn predict_content_performance(
        &self,
        content_data: &serde_json::Value,
    ) -> Result<serde_json::Value, OpenAIError> {
        let prompt = format!(
            "Predict the performance of this content: expected views, engagement, \
             shares, a confidence score (0-1), and optimization suggestions.\n\
             Content data: {}\n\n\
             Return a JSON object: {{\"predicted_views\": number, \
             \"predicted_engagement\": number, \"predicted_shares\": number, \
             \"confidence_score\": number, \"optimization_suggestions\": [string]}}",
            content_data
        );

        self.openai
            .analyze_json(
                "You are an expert content strategist. Respond with JSON format only.",
                &prompt,
            )
            .await
    }

    /// Attribute revenue to content touchpoints
    pub async fn track_revenue_attribution(
        &self,
        conversion_data: &serde_json::Value,
    ) -> Result<serde_json::Value, OpenAIError> {
        let prompt = format!(
            "Attribute revenue across content touchpoints in this conversion data: \
             direct and influenced revenue per piece, per-touchpoint contribution, \
             and ROI.\nData: {}\n\n\
             Return a JSON object: {{\"results\": [{{\"content_piece\": string, \
             \"direct_revenue\": number, \"influenced_revenue\": number, \
             \"touchpoint_contribution\": [{{\"touchpoint\": string, \
             \"attribution\": number, \"stage\": string}}], \"roi\": number}}]}}",
            conversion_data
        );

        self.openai
            .analyze_json(
                "You are an expert marketing attribution analyst. Respond with JSON format only.",
                &prompt,
            )
            .await
    }

    /// Estimate a competitor domain's traffic profile
    pub async fn estimate_competitor_traffic(
        &self,
        domain: &str,
    ) -> Result<serde_json::Value, OpenAIError> {
        let prompt = format!(
            "Estimate the traffic profile of {}: monthly traffic, top pages with \
             estimated traffic and keywords, and source split (organic, paid, \
             direct, social, referral).\n\n\
             Return a JSON object: {{\"domain\": string, \
             \"estimated_monthly_traffic\": number, \"top_pages\": [{{\"url\": \
             string, \"estimated_traffic\": number, \"keywords\": [string]}}], \
             \"traffic_sources\": {{\"organic\": number, \"paid\": number, \
             \"direct\": number, \"social\": number, \"referral\": number}}}}",
            domain
        );

        self.openai
            .analyze_json(
                "You are an expert traffic analyst. Respond with JSON format only.",
                &prompt,
            )
            .await
    }

    /// Correlate social sentiment with content performance
    pub async fn correlate_social_sentiment(
        &self,
        social_data: &serde_json::Value,
        performance_data: &serde_json::Value,
    ) -> Result<serde_json::Value, OpenAIError> {
        let prompt = format!(
            "Correlate this social sentiment data with content performance: per \
             platform, report sentiment score (-1 to 1), mention volume, and \
             correlation with traffic and conversions.\n\
             Social data: {}\nPerformance data: {}\n\n\
             Return a JSON object: {{\"results\": [{{\"platform\": string, \
             \"sentiment_score\": number, \"mention_volume\": number, \
             \"correlation_with_traffic\": number, \
             \"correlation_with_conversions\": number}}]}}",
            social_data, performance_data
        );

        self.openai
            .analyze_json(
                "You are an expert social analytics researcher. Respond with JSON format only.",
                &prompt,
            )
            .await
    }
}
