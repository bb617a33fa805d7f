//! The knowledge service.
//!
//! Every read operation takes one snapshot of the collection through a
//! blocking storage task and runs synchronous graph code over it.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use canvas_embeddings::{embed_or_zero, EmbeddingProvider};
use canvas_graph::{
    ApiOracle, ApiOracleConfig, ClusterSummary, Graph, GraphConfig, GraphExporter, GraphOracle,
    RelatedItem, RelatedItemFinder, SearchHit,
};
use canvas_storage::{Storage, StorageError};
use canvas_types::{Item, ItemId, NewItem, Settings};

use crate::error::ServiceError;
use crate::insights::{
    analytics, collection_stats, recommendations, trending_topics, Analytics, CollectionStats,
    Recommendation, TrendingTopic,
};

/// Outcome of a reindex run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexReport {
    pub updated: usize,
    pub failed: usize,
}

/// Outcome of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    pub first_id: Option<ItemId>,
    pub last_id: Option<ItemId>,
}

/// Async facade over storage, graph export and embeddings.
pub struct KnowledgeService {
    storage: Arc<Storage>,
    embedder: Arc<dyn EmbeddingProvider>,
    exporter: Arc<GraphExporter>,
    finder: RelatedItemFinder,
    concurrency: usize,
}

impl KnowledgeService {
    pub fn new(
        storage: Arc<Storage>,
        embedder: Arc<dyn EmbeddingProvider>,
        exporter: GraphExporter,
        finder: RelatedItemFinder,
        concurrency: usize,
    ) -> Self {
        Self {
            storage,
            embedder,
            exporter: Arc::new(exporter),
            finder,
            concurrency: concurrency.max(1),
        }
    }

    /// Wire every component from loaded settings.
    ///
    /// The oracle is attached only when configured; otherwise exports use
    /// topic-frequency clustering.
    pub fn from_settings(
        storage: Arc<Storage>,
        settings: &Settings,
        graph: &GraphConfig,
    ) -> Result<Self, ServiceError> {
        graph.validate()?;
        let embedder = canvas_embeddings::from_settings(&settings.embeddings)?;

        let oracle: Option<Arc<dyn GraphOracle>> =
            match ApiOracleConfig::from_settings(&settings.oracle) {
                Some(config) => {
                    info!(model = %config.model, "Oracle enabled");
                    Some(Arc::new(ApiOracle::new(config)?))
                }
                None => {
                    info!("Oracle not configured, using topic clustering");
                    None
                }
            };

        let exporter = GraphExporter::new(
            graph,
            oracle,
            Duration::from_secs(settings.oracle.timeout_secs),
        );
        let finder = RelatedItemFinder::new(graph.related.clone(), graph.search.clone());

        Ok(Self::new(
            storage,
            embedder,
            exporter,
            finder,
            settings.embeddings.concurrency,
        ))
    }

    /// Run a storage call on the blocking pool.
    async fn blocking<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        T: Send + 'static,
        F: FnOnce(&Storage) -> Result<T, StorageError> + Send + 'static,
    {
        let storage = self.storage.clone();
        tokio::task::spawn_blocking(move || f(&storage))
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))?
            .map_err(ServiceError::from)
    }

    async fn snapshot(&self) -> Result<Vec<Item>, ServiceError> {
        let items = self.blocking(|s| s.list_items()).await?;
        debug!(items = items.len(), "Loaded snapshot");
        Ok(items)
    }

    /// Clustered graph export.
    #[instrument(skip(self))]
    pub async fn export_graph(&self) -> Result<Graph, ServiceError> {
        let items = self.snapshot().await?;
        Ok(self.exporter.export_clustered(&items).await)
    }

    /// Unclustered graph with pairwise edges.
    #[instrument(skip(self))]
    pub async fn export_all(&self) -> Result<Graph, ServiceError> {
        let items = self.snapshot().await?;
        let exporter = self.exporter.clone();
        tokio::task::spawn_blocking(move || exporter.export_all(&items))
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))
    }

    /// Density cluster summaries.
    #[instrument(skip(self))]
    pub async fn clusters(&self) -> Result<Vec<ClusterSummary>, ServiceError> {
        let items = self.snapshot().await?;
        let exporter = self.exporter.clone();
        tokio::task::spawn_blocking(move || exporter.cluster_summaries(&items))
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))
    }

    /// Items most similar to `id`.
    pub async fn related(
        &self,
        id: ItemId,
        limit: Option<usize>,
    ) -> Result<Vec<RelatedItem>, ServiceError> {
        let items = self.snapshot().await?;
        Ok(self.finder.find(&items, id, limit))
    }

    /// Rank stored items against a free-text query.
    ///
    /// An embedding failure yields no hits rather than an error.
    #[instrument(skip(self))]
    pub async fn semantic_search(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SearchHit>, ServiceError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let vector = embed_or_zero(self.embedder.as_ref(), query).await;
        let items = self.snapshot().await?;
        let hits = self.finder.search(&items, &vector, limit);
        info!(hits = hits.len(), "Semantic search complete");
        Ok(hits)
    }

    pub async fn trending(&self, limit: usize) -> Result<Vec<TrendingTopic>, ServiceError> {
        Ok(trending_topics(&self.snapshot().await?, limit))
    }

    pub async fn analytics(&self) -> Result<Analytics, ServiceError> {
        Ok(analytics(&self.snapshot().await?))
    }

    pub async fn recommendations(&self, limit: usize) -> Result<Vec<Recommendation>, ServiceError> {
        Ok(recommendations(&self.snapshot().await?, limit))
    }

    pub async fn stats(&self) -> Result<CollectionStats, ServiceError> {
        Ok(collection_stats(&self.snapshot().await?))
    }

    /// Re-embed every item from its title and summary.
    ///
    /// Failures are counted, never fatal; the item keeps its old embedding.
    #[instrument(skip(self))]
    pub async fn reindex(&self) -> Result<ReindexReport, ServiceError> {
        let items = self.snapshot().await?;
        let total = items.len();

        let outcomes: Vec<bool> = stream::iter(items)
            .map(|item| async move {
                let embedding = match self.embedder.embed(&item.embedding_text()).await {
                    Ok(embedding) => embedding,
                    Err(e) => {
                        warn!(item_id = item.id, error = %e, "Failed to embed item");
                        return false;
                    }
                };
                let id = item.id;
                match self
                    .blocking(move |s| s.update_embedding(id, embedding))
                    .await
                {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(item_id = id, error = %e, "Failed to store embedding");
                        false
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let updated = outcomes.iter().filter(|ok| **ok).count();
        let report = ReindexReport {
            updated,
            failed: total - updated,
        };
        info!(updated = report.updated, failed = report.failed, "Reindex complete");
        Ok(report)
    }

    /// Store new records; ids are assigned by storage.
    pub async fn import_items(&self, records: Vec<NewItem>) -> Result<ImportReport, ServiceError> {
        if records.is_empty() {
            return Ok(ImportReport::default());
        }
        let stored = self.blocking(move |s| s.put_new_items(records)).await?;
        let report = ImportReport {
            imported: stored.len(),
            first_id: stored.first().map(|i| i.id),
            last_id: stored.last().map(|i| i.id),
        };
        info!(imported = report.imported, "Import complete");
        Ok(report)
    }

    /// Import a JSON array of item records from a file.
    pub async fn import_file(&self, path: &Path) -> Result<ImportReport, ServiceError> {
        let text = tokio::fs::read_to_string(path).await?;
        let records: Vec<NewItem> = serde_json::from_str(&text).map_err(|e| {
            ServiceError::InvalidInput(format!("{}: {}", path.display(), e))
        })?;
        self.import_items(records).await
    }

    /// Delete every item. Returns the number removed.
    pub async fn reset(&self) -> Result<usize, ServiceError> {
        let removed = self.blocking(|s| s.delete_all()).await?;
        warn!(removed, "Collection reset");
        Ok(removed)
    }
}
