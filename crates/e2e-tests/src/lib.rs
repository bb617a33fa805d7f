//! End-to-end test infrastructure for MindCanvas.
//!
//! Provides a shared TestHarness and fixture collections for tests
//! covering import, clustering, export and search.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use canvas_embeddings::{EmbeddingError, EmbeddingProvider, HashEmbedder};
use canvas_graph::{GraphConfig, GraphExporter, GraphOracle, RelatedItemFinder};
use canvas_service::KnowledgeService;
use canvas_storage::Storage;
use canvas_types::NewItem;

/// Shared test harness for E2E tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Shared storage instance
    pub storage: Arc<Storage>,
    pub config: GraphConfig,
}

impl TestHarness {
    /// Create a new test harness with temp directory and storage.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let storage =
            Arc::new(Storage::open(temp_dir.path()).expect("Failed to open test storage"));

        Self {
            _temp_dir: temp_dir,
            storage,
            config: GraphConfig::default(),
        }
    }

    /// Service with the offline hash embedder and no oracle.
    pub fn service(&self) -> KnowledgeService {
        self.service_with(None, Arc::new(HashEmbedder::new(64).expect("valid dimension")))
    }

    /// Service with an explicit oracle and embedder.
    pub fn service_with(
        &self,
        oracle: Option<Arc<dyn GraphOracle>>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> KnowledgeService {
        KnowledgeService::new(
            self.storage.clone(),
            embedder,
            GraphExporter::new(&self.config, oracle, Duration::from_secs(2)),
            RelatedItemFinder::new(self.config.related.clone(), self.config.search.clone()),
            4,
        )
    }

    /// Store records directly, bypassing the service.
    pub fn seed(&self, records: Vec<NewItem>) {
        self.storage
            .put_new_items(records)
            .expect("Failed to seed items");
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Embedding provider that is always unreachable.
pub struct UnreachableEmbedder;

#[async_trait]
impl EmbeddingProvider for UnreachableEmbedder {
    fn name(&self) -> &str {
        "unreachable"
    }

    fn dimension(&self) -> usize {
        64
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Api("connection refused".to_string()))
    }
}

/// Build a record with topics, content type and quality.
pub fn record(title: &str, topics: &[&str], content_type: &str, quality: u8) -> NewItem {
    let mut record = NewItem::new(title);
    record.summary = format!("Summary of {}", title);
    record.topics = topics.iter().map(|t| t.to_string()).collect();
    record.content_type = content_type.to_string();
    record.quality_score = quality;
    record.url = format!("https://example.com/{}", title.to_lowercase().replace(' ', "-"));
    record
}

/// A browsing history with two clear themes and one stray page.
///
/// Ids after seeding an empty store: 1-3 Python, 4-6 machine learning,
/// 7 cooking.
pub fn themed_collection() -> Vec<NewItem> {
    vec![
        record("Python List Comprehensions", &["Python Programming", "Syntax"], "Tutorial", 8),
        record("Python Decorators", &["Python"], "Tutorial", 7),
        record("Python Packaging Guide", &["Python", "Tooling"], "Article", 6),
        record("Gradient Descent", &["Machine Learning"], "Article", 9),
        record("Backpropagation", &["Machine Learning", "Neural Networks"], "Article", 8),
        record("Overfitting Explained", &["machine learning basics"], "Video", 5),
        record("Sourdough Starter", &["Cooking"], "Recipe", 4),
    ]
}

/// Attach unit embeddings so density clustering separates two themes.
///
/// Items 0-2 point along one axis, 3-5 along another, 6 along a third.
pub fn with_theme_embeddings(mut records: Vec<NewItem>) -> Vec<NewItem> {
    for (i, record) in records.iter_mut().enumerate() {
        let mut v = vec![0.0f32; 8];
        let axis = match i {
            0..=2 => 0,
            3..=5 => 1,
            _ => 2,
        };
        v[axis] = 1.0;
        // Small per-item offset keeps vectors distinct but close
        v[7] = 0.05 * i as f32;
        record.embedding = Some(v);
    }
    records
}
