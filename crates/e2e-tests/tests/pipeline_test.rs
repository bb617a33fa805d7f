//! End-to-end pipeline tests for MindCanvas.
//!
//! Verifies the complete flow: import -> reindex -> clustered export ->
//! cluster summaries -> related items and semantic search.

use canvas_graph::{ClusterMethod, EdgeKind};
use canvas_types::ItemId;
use e2e_tests::{themed_collection, with_theme_embeddings, TestHarness};
use pretty_assertions::assert_eq;

/// Import, embed, and export a themed collection without an oracle.
#[tokio::test]
async fn test_pipeline_import_reindex_export() {
    let harness = TestHarness::new();
    let service = harness.service();

    // 1. Import records; ids are assigned in order
    let report = service.import_items(themed_collection()).await.unwrap();
    assert_eq!(report.imported, 7);
    assert_eq!(report.first_id, Some(1));
    assert_eq!(report.last_id, Some(7));

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.total_items, 7);
    assert_eq!(stats.embedded_items, 0);
    assert_eq!(stats.distinct_topics, 8);

    // 2. Reindex fills every embedding
    let reindex = service.reindex().await.unwrap();
    assert_eq!(reindex.updated, 7);
    assert_eq!(reindex.failed, 0);
    assert_eq!(service.stats().await.unwrap().embedded_items, 7);

    // 3. Clustered export groups by canonical topic
    let graph = service.export_graph().await.unwrap();
    assert_eq!(
        graph.metadata.cluster_method,
        Some(ClusterMethod::TopicSpecificity)
    );
    let clusters: Vec<(ItemId, Option<String>)> = graph
        .nodes
        .iter()
        .map(|n| (n.id, n.cluster.clone()))
        .collect();
    assert_eq!(
        clusters,
        vec![
            (1, Some("Python".to_string())),
            (2, Some("Python".to_string())),
            (3, Some("Python".to_string())),
            (4, Some("Machine Learning".to_string())),
            (5, Some("Machine Learning".to_string())),
            (6, Some("Machine Learning".to_string())),
            (7, Some("Cooking".to_string())),
        ]
    );

    // 4. Complete subgraph per cluster, nothing for the lone item
    assert_eq!(graph.metadata.total_edges, 6);
    assert!(graph.edges.iter().all(|e| e.kind == EdgeKind::Cluster));
    assert!(graph.edges.iter().all(|e| e.source != 7 && e.target != 7));
}

/// Density clustering separates two embedding themes; the stray item still
/// lands in a cluster.
#[tokio::test]
async fn test_pipeline_density_clusters_and_neighbors() {
    let harness = TestHarness::new();
    harness.seed(with_theme_embeddings(themed_collection()));
    let service = harness.service();

    let clusters = service.clusters().await.unwrap();
    let members: Vec<Vec<ItemId>> = clusters.iter().map(|c| c.items.clone()).collect();

    // Equal sizes; higher average quality first. The stray item is placed
    // by topic after the density clusters.
    assert_eq!(members, vec![vec![4, 5, 6], vec![1, 2, 3], vec![7]]);
    assert_eq!(clusters[0].top_topics[0], "Machine Learning");
    assert_eq!(clusters[1].content_count, 3);
    assert_eq!(clusters[2].id, 3);
    assert_eq!(clusters[2].name, "Cooking");

    let related: Vec<ItemId> = service
        .related(1, None)
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(related, vec![2, 3]);
}

/// Export-all links near-identical embeddings semantically.
#[tokio::test]
async fn test_pipeline_export_all_edges() {
    let harness = TestHarness::new();
    harness.seed(with_theme_embeddings(themed_collection()));
    let service = harness.service();

    let graph = service.export_all().await.unwrap();
    assert_eq!(graph.metadata.total_nodes, 7);
    assert!(graph.metadata.cluster_method.is_none());

    let semantic = graph
        .edges
        .iter()
        .find(|e| e.pair() == (1, 2))
        .expect("items 1 and 2 should be linked");
    assert_eq!(semantic.kind, EdgeKind::Semantic);

    let counts = graph.metadata.edge_types.expect("edge counts");
    assert!(counts.semantic >= 1);
    assert!(graph.edges.len() <= 7 * 3);
}

/// Searching with an item's own text ranks that item first.
#[tokio::test]
async fn test_pipeline_semantic_search() {
    let harness = TestHarness::new();
    let service = harness.service();
    service.import_items(themed_collection()).await.unwrap();
    service.reindex().await.unwrap();

    let item = harness.storage.get_item(2).unwrap().unwrap();
    let hits = service
        .semantic_search(&item.embedding_text(), Some(3))
        .await
        .unwrap();

    assert!(!hits.is_empty());
    assert!(hits.len() <= 3);
    assert_eq!(hits[0].item.id, 2);
    assert!((hits[0].similarity - 1.0).abs() < 1e-3);
}

/// Insights reflect imported content.
#[tokio::test]
async fn test_pipeline_insights() {
    let harness = TestHarness::new();
    let service = harness.service();
    service.import_items(themed_collection()).await.unwrap();

    let trending = service.trending(3).await.unwrap();
    assert_eq!(trending.len(), 3);
    assert_eq!(trending[0].topic, "Python");
    assert_eq!(trending[0].count, 2);

    let recommendations = service.recommendations(10).await.unwrap();
    let ids: Vec<ItemId> = recommendations.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![4, 1, 5, 2]);

    let analytics = service.analytics().await.unwrap();
    assert_eq!(analytics.total_content, 7);
    assert_eq!(analytics.by_content_type["Article"], 3);
    assert_eq!(analytics.by_processing_method["unknown"], 7);
}
