//! # canvas-embeddings
//!
//! Embedding providers for MindCanvas items.
//!
//! Embedding generation is a black box to the rest of the workspace: text in,
//! fixed-length vector out. Two providers are available:
//! - `HashEmbedder`: deterministic, offline
//! - `OpenAiEmbedder`: any OpenAI-compatible `/embeddings` endpoint

pub mod error;
pub mod hash;
pub mod openai;
pub mod provider;

use std::sync::Arc;

use canvas_types::EmbeddingSettings;
use tracing::info;

pub use error::EmbeddingError;
pub use hash::HashEmbedder;
pub use openai::{OpenAiEmbedder, OpenAiEmbedderConfig};
pub use provider::{embed_or_zero, is_zero_vector, EmbeddingProvider};

/// Build the provider named in settings.
pub fn from_settings(
    settings: &EmbeddingSettings,
) -> Result<Arc<dyn EmbeddingProvider>, EmbeddingError> {
    let provider: Arc<dyn EmbeddingProvider> = match settings.provider.as_str() {
        "hash" => Arc::new(HashEmbedder::new(settings.dimension)?),
        "openai" => {
            let api_key = settings
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    EmbeddingError::Config("embeddings.api_key is required for openai".to_string())
                })?;
            let mut config =
                OpenAiEmbedderConfig::openai(api_key, settings.model.clone(), settings.dimension);
            if let Some(base_url) = &settings.api_base_url {
                config = config.with_base_url(base_url.clone());
            }
            Arc::new(OpenAiEmbedder::new(config)?)
        }
        other => {
            return Err(EmbeddingError::Config(format!(
                "unknown embedding provider: {}",
                other
            )))
        }
    };

    info!(
        provider = provider.name(),
        dimension = provider.dimension(),
        "Embedding provider ready"
    );
    Ok(provider)
}
