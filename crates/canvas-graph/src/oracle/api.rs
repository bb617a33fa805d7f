//! Oracle backed by an OpenAI-compatible chat completions endpoint.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use canvas_types::OracleSettings;

use super::{GraphOracle, OracleError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for the API oracle.
#[derive(Debug, Clone)]
pub struct ApiOracleConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Model to use (e.g., "gpt-4.1-mini")
    pub model: String,

    /// API key
    pub api_key: SecretString,

    /// Request timeout
    pub timeout: Duration,

    /// Completion token budget
    pub max_tokens: u32,
}

impl ApiOracleConfig {
    /// Create config for the public OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(60),
            max_tokens: 4000,
        }
    }

    /// Build from settings. Returns `None` when the oracle is disabled or has no key.
    pub fn from_settings(settings: &OracleSettings) -> Option<Self> {
        if !settings.is_configured() {
            return None;
        }
        let api_key = settings.api_key.clone()?;
        let mut config = Self::openai(api_key, settings.model.clone());
        if let Some(base_url) = &settings.api_base_url {
            config.base_url = base_url.clone();
        }
        config.timeout = Duration::from_secs(settings.timeout_secs);
        Some(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions oracle. One request per call, JSON mode, temperature 0.
pub struct ApiOracle {
    client: Client,
    config: ApiOracleConfig,
}

impl ApiOracle {
    pub fn new(config: ApiOracleConfig) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OracleError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl GraphOracle for ApiOracle {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: 0.0,
            max_tokens: self.config.max_tokens,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        debug!(url = %url, model = %self.config.model, "Calling oracle");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout
                } else {
                    OracleError::ApiError(e.to_string())
                }
            })?;

        if response.status() == 429 {
            return Err(OracleError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::ApiError(format!("HTTP {}: {}", status, body)));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::ParseError(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OracleError::ParseError("No choices in response".to_string()))
    }
}
