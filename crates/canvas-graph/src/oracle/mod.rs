//! External reasoning oracle for cluster and edge selection.
//!
//! One batched request asks the oracle to both cluster the collection and
//! pick edges. The response crosses a parse-then-validate boundary before
//! anything downstream sees it, and every failure degrades to "no result".

mod adapter;
mod api;
mod mock;
mod prompt;
mod response;

pub use adapter::{GraphOracleAdapter, OracleClustering};
pub use api::{ApiOracle, ApiOracleConfig};
pub use mock::MockOracle;
pub use prompt::{build_prompt, NodeDescriptor};
pub use response::{parse_response, OracleEdge, OracleGraph};

use async_trait::async_trait;
use thiserror::Error;

/// Error type for oracle operations.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Failed to parse oracle response: {0}")]
    ParseError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Timeout waiting for response")]
    Timeout,

    #[error("Oracle returned no clusters")]
    EmptyClusters,
}

/// Pluggable completion backend.
#[async_trait]
pub trait GraphOracle: Send + Sync {
    /// Send one prompt and return the raw completion text.
    async fn complete(&self, prompt: &str) -> Result<String, OracleError>;
}
