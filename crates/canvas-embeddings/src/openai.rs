//! Embedder for OpenAI-compatible `/embeddings` endpoints.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::EmbeddingError;
use crate::provider::EmbeddingProvider;

/// Configuration for the API embedder.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedderConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Model to use (e.g., "text-embedding-3-small")
    pub model: String,

    /// API key
    pub api_key: SecretString,

    /// Expected vector length
    pub dimension: usize,

    /// Request timeout
    pub timeout: Duration,
}

impl OpenAiEmbedderConfig {
    /// Create config for the public OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            dimension,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// API-based embedding provider.
pub struct OpenAiEmbedder {
    client: Client,
    config: OpenAiEmbedderConfig,
}

impl OpenAiEmbedder {
    pub fn new(config: OpenAiEmbedderConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    async fn request(&self, inputs: Vec<&str>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let expected = inputs.len();
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: inputs,
        };

        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));
        debug!(url = %url, count = expected, "Requesting embeddings");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingError::Api(e.to_string()))?;

        if response.status() == 429 {
            return Err(EmbeddingError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("HTTP {}: {}", status, body)));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Parse(e.to_string()))?;

        if body.data.len() != expected {
            return Err(EmbeddingError::Parse(format!(
                "expected {} embeddings, got {}",
                expected,
                body.data.len()
            )));
        }

        body.data
            .into_iter()
            .map(|d| {
                if d.embedding.len() != self.config.dimension {
                    Err(EmbeddingError::DimensionMismatch {
                        expected: self.config.dimension,
                        actual: d.embedding.len(),
                    })
                } else {
                    Ok(d.embedding)
                }
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("empty text".to_string()));
        }
        let mut vectors = self.request(vec![text]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::Parse("No embedding in response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts.iter().map(String::as_str).collect()).await
    }
}
