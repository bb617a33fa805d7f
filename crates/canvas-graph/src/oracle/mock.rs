//! Mock oracle for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{GraphOracle, OracleError};

enum Behavior {
    Respond(String),
    Fail,
    Stall(Duration),
}

/// Oracle with canned behavior. Counts calls so tests can assert on them.
pub struct MockOracle {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl MockOracle {
    /// Always answer with `response`.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self::new(Behavior::Respond(response.into()))
    }

    /// Always fail with a transport error.
    pub fn failing() -> Self {
        Self::new(Behavior::Fail)
    }

    /// Sleep for `delay` before answering with an empty object.
    pub fn stalling(delay: Duration) -> Self {
        Self::new(Behavior::Stall(delay))
    }

    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of completed or attempted calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphOracle for MockOracle {
    async fn complete(&self, _prompt: &str) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Respond(text) => Ok(text.clone()),
            Behavior::Fail => Err(OracleError::ApiError("mock transport failure".to_string())),
            Behavior::Stall(delay) => {
                tokio::time::sleep(*delay).await;
                Ok("{}".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_response_and_call_count() {
        let oracle = MockOracle::with_response("{\"clusters\": []}");
        assert_eq!(oracle.complete("a").await.unwrap(), "{\"clusters\": []}");
        oracle.complete("b").await.unwrap();
        assert_eq!(oracle.calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let oracle = MockOracle::failing();
        assert!(matches!(
            oracle.complete("a").await,
            Err(OracleError::ApiError(_))
        ));
    }
}
