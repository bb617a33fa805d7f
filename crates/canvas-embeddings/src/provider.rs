//! Embedding provider trait.
//!
//! Defines the interface for turning item text into vectors.

use async_trait::async_trait;
use tracing::warn;

use crate::error::EmbeddingError;

/// Trait for embedding providers.
///
/// Implementations must be thread-safe (Send + Sync) for concurrent use.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short provider name for logs (e.g. "hash", "openai")
    fn name(&self) -> &str;

    /// Length of every vector this provider returns.
    fn dimension(&self) -> usize;

    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Generate embeddings for multiple texts.
    /// Default implementation calls embed() for each text.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Embed `text`, returning a zero vector of the provider's dimension on failure.
///
/// Zero vectors have no similarity to anything, so downstream consumers treat
/// the item as unembedded.
pub async fn embed_or_zero(provider: &dyn EmbeddingProvider, text: &str) -> Vec<f32> {
    match provider.embed(text).await {
        Ok(v) => v,
        Err(e) => {
            warn!(provider = provider.name(), error = %e, "Embedding failed, using zero vector");
            vec![0.0; provider.dimension()]
        }
    }
}

/// Check whether a vector is all zeros (a failed embedding).
pub fn is_zero_vector(v: &[f32]) -> bool {
    v.iter().all(|x| *x == 0.0)
}
