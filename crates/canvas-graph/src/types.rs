//! Graph and cluster types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use canvas_types::{Item, ItemId};

/// Cluster membership of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    /// Human-readable cluster name
    pub cluster_name: String,
    /// Dense 1-based cluster id
    pub cluster_id: u32,
}

impl ClusterAssignment {
    pub fn new(cluster_name: impl Into<String>, cluster_id: u32) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            cluster_id,
        }
    }
}

/// Item id to cluster membership, ordered by id.
pub type Assignments = BTreeMap<ItemId, ClusterAssignment>;

/// How the cluster assignment of an export was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMethod {
    /// Assigned by the external oracle
    Oracle,
    /// Assigned by topic-frequency clustering
    TopicSpecificity,
}

impl ClusterMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterMethod::Oracle => "oracle",
            ClusterMethod::TopicSpecificity => "topic_specificity",
        }
    }
}

/// Why two nodes are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Shared topic labels
    Topic,
    /// Embedding similarity above threshold
    Semantic,
    /// Same known content type
    ContentType,
    /// Chosen by the oracle
    Oracle,
    /// Members of the same cluster
    Cluster,
}

/// A node in the exported graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: ItemId,
    pub title: String,
    pub content_type: String,
    pub quality_score: u8,
    pub summary: String,
    pub topics: Vec<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_method: Option<ClusterMethod>,
}

impl GraphNode {
    /// Node without cluster annotation.
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            content_type: item.content_type.clone(),
            quality_score: item.quality_score,
            summary: item.summary.clone(),
            topics: item.topics.clone(),
            url: item.url.clone(),
            processing_method: item.processing_method.clone(),
            visit_timestamp: item.visit_timestamp,
            cluster: None,
            cluster_id: None,
            cluster_method: None,
        }
    }

    pub fn with_cluster(mut self, assignment: &ClusterAssignment, method: ClusterMethod) -> Self {
        self.cluster = Some(assignment.cluster_name.clone());
        self.cluster_id = Some(assignment.cluster_id);
        self.cluster_method = Some(method);
        self
    }
}

/// An undirected edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: ItemId,
    pub target: ItemId,
    pub kind: EdgeKind,
    /// Always at least 1
    pub weight: u32,
    /// In [0, 1]
    pub similarity: f32,
    /// Shared topic labels, or the oracle's reason as a single entry
    #[serde(default)]
    pub shared_topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_cluster: Option<bool>,
}

impl GraphEdge {
    /// Unordered endpoint pair, smaller id first.
    pub fn pair(&self) -> (ItemId, ItemId) {
        canonical_pair(self.source, self.target)
    }
}

/// Order two ids so an unordered pair has a single key.
pub fn canonical_pair(a: ItemId, b: ItemId) -> (ItemId, ItemId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Edge counts per kind for the export-all path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeTypeCounts {
    pub topic: usize,
    pub semantic: usize,
    pub content_type: usize,
}

impl EdgeTypeCounts {
    pub fn from_edges(edges: &[GraphEdge]) -> Self {
        let mut counts = Self::default();
        for edge in edges {
            match edge.kind {
                EdgeKind::Topic => counts.topic += 1,
                EdgeKind::Semantic => counts.semantic += 1,
                EdgeKind::ContentType => counts.content_type += 1,
                EdgeKind::Oracle | EdgeKind::Cluster => {}
            }
        }
        counts
    }
}

/// Export metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub exported_at: DateTime<Utc>,
    pub min_similarity: f32,
    pub max_similarity: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_method: Option<ClusterMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_types: Option<EdgeTypeCounts>,
}

/// A complete exported graph. Derived per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub metadata: GraphMetadata,
}

impl Graph {
    /// Build a graph and derive its metadata from the edge list.
    pub fn new(
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
        cluster_method: Option<ClusterMethod>,
        edge_types: Option<EdgeTypeCounts>,
    ) -> Self {
        let min_similarity = edges
            .iter()
            .map(|e| e.similarity)
            .fold(None, |acc: Option<f32>, s| Some(acc.map_or(s, |a| a.min(s))))
            .unwrap_or(0.0);
        let max_similarity = edges
            .iter()
            .map(|e| e.similarity)
            .fold(None, |acc: Option<f32>, s| Some(acc.map_or(s, |a| a.max(s))))
            .unwrap_or(0.0);

        let metadata = GraphMetadata {
            total_nodes: nodes.len(),
            total_edges: edges.len(),
            exported_at: Utc::now(),
            min_similarity,
            max_similarity,
            cluster_method,
            edge_types,
        };

        Self {
            nodes,
            edges,
            metadata,
        }
    }

    /// The graph of an empty collection.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), None, None)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Summary of one cluster for the cluster-summary view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub content_count: usize,
    pub top_topics: Vec<String>,
    /// Rounded to one decimal
    pub average_quality: f64,
    /// Content type to member count
    pub content_types: BTreeMap<String, usize>,
    pub items: Vec<ItemId>,
    pub representative_title: String,
}
