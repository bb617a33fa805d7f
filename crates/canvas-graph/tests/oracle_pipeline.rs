//! Clustered export through the HTTP oracle client.

use std::sync::Arc;
use std::time::Duration;

use canvas_graph::{
    ApiOracle, ApiOracleConfig, ClusterMethod, EdgeKind, GraphConfig, GraphExporter,
};
use canvas_types::Item;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn collection() -> Vec<Item> {
    vec![
        Item::new(1, "Python List Comprehensions")
            .with_topics(["Python", "Programming"])
            .with_content_type("Tutorial"),
        Item::new(2, "Python Decorators Explained")
            .with_topics(["Python"])
            .with_content_type("Tutorial"),
        Item::new(3, "Gradient Descent")
            .with_topics(["Machine Learning"])
            .with_content_type("Article"),
        Item::new(4, "Neural Networks 101")
            .with_topics(["Machine Learning", "Deep Learning"])
            .with_content_type("Article"),
        Item::new(5, "Sourdough Starter")
            .with_topics(["Cooking"])
            .with_content_type("Recipe"),
    ]
}

async fn exporter_for(server: &MockServer) -> GraphExporter {
    let oracle = ApiOracle::new(
        ApiOracleConfig::openai("sk-test", "gpt-4.1-mini").with_base_url(server.uri()),
    )
    .unwrap();
    GraphExporter::new(
        &GraphConfig::default(),
        Some(Arc::new(oracle)),
        Duration::from_secs(5),
    )
}

fn completion(content: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"content": content.to_string()}}]
    }))
}

#[tokio::test]
async fn test_accepted_oracle_graph() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion(json!({
            "clusters": [
                {"name": "Python Programming", "node_ids": ["1", "2"]},
                {"name": "Machine Learning", "node_ids": [3, 4]}
            ],
            "edges": [
                {"source": "1", "target": "2", "reason": "Both teach Python idioms"},
                {"source": "2", "target": "3", "reason": "Python used for ML"},
                {"source": "4", "target": "3", "reason": "Core ML training concepts"},
                {"source": "3", "target": "4", "reason": "Duplicate pair"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let graph = exporter_for(&server).await.export_clustered(&collection()).await;

    assert_eq!(graph.metadata.cluster_method, Some(ClusterMethod::Oracle));
    let clusters: Vec<(i64, Option<u32>)> =
        graph.nodes.iter().map(|n| (n.id, n.cluster_id)).collect();
    // Item 5 is gap-filled into a cluster after the oracle's two
    assert_eq!(
        clusters,
        vec![(1, Some(1)), (2, Some(1)), (3, Some(2)), (4, Some(2)), (5, Some(3))]
    );
    assert_eq!(graph.nodes[4].cluster.as_deref(), Some("Cooking"));

    assert_eq!(graph.edges.len(), 3);
    assert!(graph.edges.iter().all(|e| e.kind == EdgeKind::Oracle));
    let weights: Vec<u32> = graph.edges.iter().map(|e| e.weight).collect();
    assert_eq!(weights, vec![2, 1, 2]);
}

#[tokio::test]
async fn test_low_coverage_falls_back_to_topics() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion(json!({
            "clusters": [{"name": "Python", "node_ids": ["1", "2"]}],
            "edges": []
        })))
        .mount(&server)
        .await;

    let graph = exporter_for(&server).await.export_clustered(&collection()).await;

    assert_eq!(
        graph.metadata.cluster_method,
        Some(ClusterMethod::TopicSpecificity)
    );
    assert!(graph.edges.iter().all(|e| e.kind == EdgeKind::Cluster));
}

#[tokio::test]
async fn test_server_error_falls_back_to_topics() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let graph = exporter_for(&server).await.export_clustered(&collection()).await;

    assert_eq!(graph.nodes.len(), 5);
    assert_eq!(
        graph.metadata.cluster_method,
        Some(ClusterMethod::TopicSpecificity)
    );
}

#[tokio::test]
async fn test_oracle_without_edges_uses_membership() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion(json!({
            "clusters": [
                {"name": "Code", "node_ids": ["1", "2", "3"]},
                {"name": "Life", "node_ids": ["4", "5"]}
            ]
        })))
        .mount(&server)
        .await;

    let graph = exporter_for(&server).await.export_clustered(&collection()).await;

    assert_eq!(graph.metadata.cluster_method, Some(ClusterMethod::Oracle));
    assert_eq!(graph.edges.len(), 4);
    assert!(graph.edges.iter().all(|e| e.same_cluster == Some(true)));
}
