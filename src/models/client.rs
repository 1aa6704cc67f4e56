//! Gemini API client
//!
//! Calls `POST {base_url}/models/{model}:generateContent` with the API key in
//! the `x-goog-api-key` header. No explicit timeout is set; the HTTP client
//! default applies.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::types::{GenerateContentRequest, GenerateContentResponse};
use super::GenerativeModel;
use crate::config::ModelConfig;
use crate::errors::{MedQueryError, Result};

/// HTTP client for the Gemini generative language API
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// # Arguments
    /// * `api_key` - Google API key
    /// * `config` - model name, sampling temperature and API base URL
    pub fn new(api_key: &str, config: &ModelConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.name.clone(),
            temperature: config.temperature,
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Check that the API key is accepted and the model exists
    ///
    /// Calls GET /models/{model}
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/models/{}", self.base_url, self.model);
        self.client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest::user_prompt(prompt, self.temperature);
        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "generateContent");

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MedQueryError::ModelError(format!(
                "Gemini API error {}: {}",
                status,
                body.trim()
            )));
        }

        let parsed: GenerateContentResponse = response.json().await?;

        if let Some(reason) = parsed.block_reason() {
            return Err(MedQueryError::ModelError(format!(
                "Prompt was blocked by the model ({})",
                reason
            )));
        }

        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(MedQueryError::ModelError(
                "Model returned an empty response".to_string(),
            ));
        }

        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_url() {
        let client = GeminiClient::new("key", &ModelConfig::default());
        assert_eq!(
            client.generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(client.model_name(), "gemini-2.0-flash");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ModelConfig {
            base_url: "http://localhost:8080/v1beta/".to_string(),
            ..Default::default()
        };
        let client = GeminiClient::new("key", &config);
        assert!(client.generate_url().starts_with("http://localhost:8080/v1beta/models/"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_errors() {
        let config = ModelConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let client = GeminiClient::new("key", &config);
        assert!(client.generate("hello").await.is_err());
        assert!(!client.is_available().await);
    }

    #[tokio::test]
    #[ignore] // Integration test - requires GOOGLE_API_KEY
    async fn test_live_generation() {
        let key = std::env::var("GOOGLE_API_KEY").unwrap();
        let client = GeminiClient::new(&key, &ModelConfig::default());
        let text = client.generate("Reply with the word ok.").await.unwrap();
        assert!(!text.is_empty());
    }
}
