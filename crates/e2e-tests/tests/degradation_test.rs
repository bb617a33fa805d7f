//! Graceful degradation tests for MindCanvas.
//!
//! Verifies the system keeps answering when components are missing:
//! - Oracle failing, stalling, or returning too little -> topic clustering
//! - No embeddings -> content-type cluster summaries
//! - Embedding provider unreachable -> reindex counts failures, search is empty
//! - Empty collection -> empty results everywhere

use std::sync::Arc;
use std::time::Duration;

use canvas_graph::{ClusterMethod, GraphOracle, MockOracle};
use canvas_types::ItemId;
use e2e_tests::{themed_collection, TestHarness, UnreachableEmbedder};
use pretty_assertions::assert_eq;
use serde_json::json;

fn hash_embedder() -> Arc<canvas_embeddings::HashEmbedder> {
    Arc::new(canvas_embeddings::HashEmbedder::new(64).unwrap())
}

fn cluster_names(graph: &canvas_graph::Graph) -> Vec<(ItemId, Option<u32>, Option<String>)> {
    graph
        .nodes
        .iter()
        .map(|n| (n.id, n.cluster_id, n.cluster.clone()))
        .collect()
}

/// An oracle that errors leaves the offline export unchanged.
#[tokio::test]
async fn test_failing_oracle_matches_offline_export() {
    let harness = TestHarness::new();
    harness.seed(themed_collection());

    let offline = harness.service().export_graph().await.unwrap();

    let oracle = Arc::new(MockOracle::failing());
    let service = harness.service_with(Some(oracle.clone() as Arc<dyn GraphOracle>), hash_embedder());
    let degraded = service.export_graph().await.unwrap();

    assert_eq!(oracle.calls(), 1);
    assert_eq!(
        degraded.metadata.cluster_method,
        Some(ClusterMethod::TopicSpecificity)
    );
    assert_eq!(cluster_names(&degraded), cluster_names(&offline));
    assert_eq!(degraded.edges.len(), offline.edges.len());
}

/// An oracle that assigns under half the items is rejected.
#[tokio::test]
async fn test_low_coverage_oracle_rejected() {
    let harness = TestHarness::new();
    harness.seed(themed_collection());

    let response = json!({
        "clusters": [{"name": "Python", "node_ids": [1, 2, 3]}]
    });
    let oracle = Arc::new(MockOracle::with_response(response.to_string()));
    let service = harness.service_with(Some(oracle as Arc<dyn GraphOracle>), hash_embedder());

    let graph = service.export_graph().await.unwrap();
    assert_eq!(
        graph.metadata.cluster_method,
        Some(ClusterMethod::TopicSpecificity)
    );
}

/// An accepted oracle graph gap-fills the item it skipped.
#[tokio::test]
async fn test_accepted_oracle_gap_fills_skipped_item() {
    let harness = TestHarness::new();
    harness.seed(themed_collection());

    let response = json!({
        "clusters": [
            {"name": "Python Craft", "node_ids": [1, 2, 3]},
            {"name": "Learning Machines", "node_ids": ["4", "5", "6"]}
        ]
    });
    let oracle = Arc::new(MockOracle::with_response(response.to_string()));
    let service = harness.service_with(Some(oracle as Arc<dyn GraphOracle>), hash_embedder());

    let graph = service.export_graph().await.unwrap();
    assert_eq!(graph.metadata.cluster_method, Some(ClusterMethod::Oracle));

    let node = graph.nodes.iter().find(|n| n.id == 7).unwrap();
    assert_eq!(node.cluster.as_deref(), Some("Cooking"));
    assert_eq!(node.cluster_id, Some(3));

    // No oracle edges: complete subgraphs for the two oracle clusters
    assert_eq!(graph.edges.len(), 6);
}

/// A stalled oracle times out and the export still completes.
#[tokio::test(start_paused = true)]
async fn test_stalled_oracle_times_out() {
    let harness = TestHarness::new();
    harness.seed(themed_collection());

    let oracle = Arc::new(MockOracle::stalling(Duration::from_secs(600)));
    let service = harness.service_with(Some(oracle as Arc<dyn GraphOracle>), hash_embedder());

    let graph = service.export_graph().await.unwrap();
    assert_eq!(graph.metadata.total_nodes, 7);
    assert_eq!(
        graph.metadata.cluster_method,
        Some(ClusterMethod::TopicSpecificity)
    );
}

/// Without embeddings, summaries group by content type.
#[tokio::test]
async fn test_no_embeddings_groups_by_content_type() {
    let harness = TestHarness::new();
    harness.seed(themed_collection());

    let clusters = harness.service().clusters().await.unwrap();
    let names: Vec<&str> = clusters.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Tutorial Cluster",
            "Article Cluster",
            "Video Cluster",
            "Recipe Cluster"
        ]
    );
    assert_eq!(clusters[1].items, vec![3, 4, 5]);
}

/// An unreachable embedder fails every reindex and finds nothing.
#[tokio::test]
async fn test_unreachable_embedder() {
    let harness = TestHarness::new();
    harness.seed(themed_collection());
    let service = harness.service_with(None, Arc::new(UnreachableEmbedder));

    let report = service.reindex().await.unwrap();
    assert_eq!(report.updated, 0);
    assert_eq!(report.failed, 7);

    assert!(service.semantic_search("python", None).await.unwrap().is_empty());
    assert_eq!(service.stats().await.unwrap().embedded_items, 0);

    // Export does not depend on embeddings
    assert_eq!(service.export_graph().await.unwrap().metadata.total_nodes, 7);
}

/// Every read path answers on an empty collection.
#[tokio::test]
async fn test_empty_collection() {
    let harness = TestHarness::new();
    let service = harness.service();

    assert!(service.export_graph().await.unwrap().is_empty());
    assert!(service.export_all().await.unwrap().is_empty());
    assert!(service.clusters().await.unwrap().is_empty());
    assert!(service.trending(15).await.unwrap().is_empty());
    assert!(service.recommendations(10).await.unwrap().is_empty());
    assert!(service.related(1, None).await.unwrap().is_empty());
    assert_eq!(service.analytics().await.unwrap().total_content, 0);
    assert_eq!(service.reindex().await.unwrap().updated, 0);
}
