//! Graph error types.

use thiserror::Error;

/// Errors that can occur during clustering and graph assembly.
///
/// Most stages degrade instead of failing; these surface only where a
/// caller has to pick the next strategy.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Too few usable embeddings for density clustering
    #[error("Insufficient embeddings: found {found}, need at least {required}")]
    InsufficientEmbeddings { found: usize, required: usize },

    /// Clustering backend error
    #[error("Clustering error: {0}")]
    Clustering(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
