//! Service error types.

use thiserror::Error;

use canvas_embeddings::EmbeddingError;
use canvas_graph::{GraphError, OracleError};
use canvas_storage::StorageError;
use canvas_types::CanvasError;

/// Errors surfaced by service operations.
///
/// Clustering and oracle problems degrade inside the graph crate; what
/// reaches here is storage, setup, or bad caller input.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Configuration error: {0}")]
    Config(#[from] CanvasError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking storage task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),
}
