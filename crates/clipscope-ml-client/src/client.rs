//! Multimodal generation HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use clipscope_models::PreparedImage;

use crate::error::{MlError, MlResult};
use crate::types::{GenerateRequest, GenerateResponse, GenerationConfig};

/// A model that answers one text prompt plus zero or more images with free text.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Make a single non-streaming call. No retry is performed.
    async fn generate(&self, prompt: &str, images: &[PreparedImage]) -> MlResult<String>;

    /// Model identifier used for logging.
    fn model_name(&self) -> &str;
}

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GenerativeClientConfig {
    pub api_key: Option<String>,
    /// Base URL of the REST API (without the model path)
    pub base_url: String,
    pub model: String,
    /// Request timeout
    pub timeout: Duration,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl Default for GenerativeClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout: Duration::from_secs(120),
            temperature: Some(0.4),
            max_output_tokens: Some(8192),
        }
    }
}

impl GenerativeClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            base_url: std::env::var("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            model: std::env::var("GEMINI_MODEL").unwrap_or(defaults.model),
            timeout: Duration::from_secs(
                std::env::var("GEMINI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            temperature: defaults.temperature,
            max_output_tokens: defaults.max_output_tokens,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    config: GenerativeClientConfig,
}

impl GeminiClient {
    /// Create a new client. Fails when no API key is configured.
    pub fn new(config: GenerativeClientConfig) -> MlResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| MlError::Config("GEMINI_API_KEY not set".to_string()))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;

        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> MlResult<Self> {
        Self::new(GenerativeClientConfig::from_env())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, prompt: &str, images: &[PreparedImage]) -> MlResult<String> {
        let request = GenerateRequest::new(
            prompt,
            images,
            Some(GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            }),
        );

        debug!(
            model = %self.config.model,
            images = images.len(),
            prompt_chars = prompt.len(),
            "Sending generation request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MlError::from_status(status, &body));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| MlError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let text = body.text().ok_or(MlError::EmptyResponse)?;
        info!(model = %self.config.model, chars = text.len(), "Generation completed");
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        let config = GenerativeClientConfig::default()
            .with_api_key("test-key")
            .with_base_url(server.uri());
        GeminiClient::new(config).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = GenerativeClientConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let result = GeminiClient::new(GenerativeClientConfig::default());
        assert!(matches!(result, Err(MlError::Config(_))));
    }

    #[tokio::test]
    async fn test_generate_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "Overall: 8/10"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let text = client
            .generate("analyze", &[PreparedImage::jpeg("AAAA")])
            .await
            .unwrap();
        assert_eq!(text, "Overall: 8/10");
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_quota() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("RESOURCE_EXHAUSTED"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).generate("analyze", &[]).await.unwrap_err();
        assert!(err.is_quota());
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("analyze", &[]).await.unwrap_err();
        assert!(matches!(err, MlError::EmptyResponse));
    }
}
