//! Graph assembly.
//!
//! Two paths: the cluster path annotates nodes with an assignment and wires
//! edges from the oracle or from cluster membership; the general path
//! derives edges pairwise from topics, embeddings and content types.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use canvas_types::{Item, ItemId};

use crate::config::EdgeConfig;
use crate::normalizer::title_case;
use crate::oracle::OracleEdge;
use crate::similarity::{cosine_similarity, round_to};
use crate::types::{
    canonical_pair, Assignments, ClusterAssignment, ClusterMethod, EdgeKind, EdgeTypeCounts,
    Graph, GraphEdge, GraphNode,
};

/// Builds export graphs from items and cluster assignments.
#[derive(Debug, Clone, Default)]
pub struct GraphAssembler {
    config: EdgeConfig,
}

/// Pairwise edge decision before ids and caps are applied.
struct Candidate {
    source: ItemId,
    target: ItemId,
    kind: EdgeKind,
    weight: u32,
    similarity: f32,
    shared_topics: Vec<String>,
}

impl GraphAssembler {
    pub fn new(config: EdgeConfig) -> Self {
        Self { config }
    }

    /// Build the clustered graph.
    ///
    /// Items without an assignment fall back to their first topic (or
    /// "General") with cluster id 0. Oracle edges are used when any are
    /// given; otherwise each cluster becomes a complete subgraph.
    #[instrument(skip_all, fields(items = items.len(), method = method.as_str()))]
    pub fn cluster_graph(
        &self,
        items: &[Item],
        assignments: &Assignments,
        method: ClusterMethod,
        oracle_edges: &[OracleEdge],
    ) -> Graph {
        if items.is_empty() {
            return Graph::empty();
        }

        let nodes: Vec<GraphNode> = items
            .iter()
            .map(|item| {
                let assignment = assignments
                    .get(&item.id)
                    .cloned()
                    .unwrap_or_else(|| unassigned(item));
                GraphNode::from_item(item).with_cluster(&assignment, method)
            })
            .collect();

        let edges = if oracle_edges.is_empty() {
            self.membership_edges(&nodes)
        } else {
            self.oracle_edges(&nodes, oracle_edges)
        };

        info!(
            nodes = nodes.len(),
            edges = edges.len(),
            "Assembled clustered graph"
        );
        Graph::new(nodes, edges, Some(method), None)
    }

    fn oracle_edges(&self, nodes: &[GraphNode], oracle_edges: &[OracleEdge]) -> Vec<GraphEdge> {
        let cluster_of: HashMap<ItemId, Option<u32>> =
            nodes.iter().map(|n| (n.id, n.cluster_id)).collect();
        let mut seen: HashSet<(ItemId, ItemId)> = HashSet::new();
        let mut edges = Vec::new();

        for edge in oracle_edges {
            let (Some(source_cluster), Some(target_cluster)) =
                (cluster_of.get(&edge.source), cluster_of.get(&edge.target))
            else {
                continue;
            };
            if edge.source == edge.target || !seen.insert(canonical_pair(edge.source, edge.target))
            {
                continue;
            }

            let same = source_cluster == target_cluster;
            edges.push(GraphEdge {
                id: format!("link_{}", edges.len()),
                source: edge.source,
                target: edge.target,
                kind: EdgeKind::Oracle,
                weight: if same { 2 } else { 1 },
                similarity: if same {
                    self.config.oracle_same_cluster_similarity
                } else {
                    self.config.oracle_cross_cluster_similarity
                },
                shared_topics: vec![edge.reason.clone()],
                same_cluster: Some(same),
            });
        }

        debug!(
            offered = oracle_edges.len(),
            kept = edges.len(),
            "Oracle edges applied"
        );
        edges
    }

    fn membership_edges(&self, nodes: &[GraphNode]) -> Vec<GraphEdge> {
        // Clusters in order of first member
        let mut clusters: Vec<(Option<u32>, Vec<ItemId>)> = Vec::new();
        for node in nodes {
            match clusters.iter_mut().find(|(id, _)| *id == node.cluster_id) {
                Some((_, members)) => members.push(node.id),
                None => clusters.push((node.cluster_id, vec![node.id])),
            }
        }

        let mut seen: HashSet<(ItemId, ItemId)> = HashSet::new();
        let mut edges = Vec::new();
        for (_, members) in &clusters {
            for (i, &source) in members.iter().enumerate() {
                for &target in &members[i + 1..] {
                    if source == target || !seen.insert(canonical_pair(source, target)) {
                        continue;
                    }
                    edges.push(GraphEdge {
                        id: format!("link_{}", edges.len()),
                        source,
                        target,
                        kind: EdgeKind::Cluster,
                        weight: 1,
                        similarity: self.config.cluster_similarity,
                        shared_topics: Vec::new(),
                        same_cluster: Some(true),
                    });
                }
            }
        }
        edges
    }

    /// Build the unclustered graph with pairwise topic, semantic and
    /// content-type edges.
    #[instrument(skip_all, fields(items = items.len()))]
    pub fn general_graph(&self, items: &[Item]) -> Graph {
        if items.is_empty() {
            return Graph::empty();
        }

        let topic_sets: Vec<HashSet<&str>> = items
            .iter()
            .map(|item| item.topics.iter().map(String::as_str).collect())
            .collect();

        let rows: Vec<Vec<Candidate>> = (0..items.len())
            .into_par_iter()
            .map(|i| {
                ((i + 1)..items.len())
                    .filter_map(|j| self.evaluate_pair(items, &topic_sets, i, j))
                    .collect()
            })
            .collect();

        let n = items.len();
        let content_type_cap = n.saturating_mul(self.config.content_type_cap_factor);
        let mut content_type_edges = 0usize;
        let mut edges: Vec<GraphEdge> = Vec::new();

        for candidate in rows.into_iter().flatten() {
            if candidate.kind == EdgeKind::ContentType {
                if content_type_edges >= content_type_cap {
                    continue;
                }
                content_type_edges += 1;
            }
            edges.push(GraphEdge {
                id: format!("edge_{}", edges.len()),
                source: candidate.source,
                target: candidate.target,
                kind: candidate.kind,
                weight: candidate.weight,
                similarity: candidate.similarity,
                shared_topics: candidate.shared_topics,
                same_cluster: None,
            });
        }

        // Stable: equal similarities keep creation order
        edges.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        let created = edges.len();
        edges.truncate(n.saturating_mul(self.config.total_cap_factor));

        let counts = EdgeTypeCounts::from_edges(&edges);
        info!(
            nodes = n,
            created,
            kept = edges.len(),
            topic = counts.topic,
            semantic = counts.semantic,
            content_type = counts.content_type,
            "Assembled general graph"
        );

        let nodes = items.iter().map(GraphNode::from_item).collect();
        Graph::new(nodes, edges, None, Some(counts))
    }

    fn evaluate_pair(
        &self,
        items: &[Item],
        topic_sets: &[HashSet<&str>],
        i: usize,
        j: usize,
    ) -> Option<Candidate> {
        let (a, b) = (&items[i], &items[j]);
        if a.id == b.id {
            return None;
        }

        let (topics_a, topics_b) = (&topic_sets[i], &topic_sets[j]);
        let mut shared: Vec<String> = Vec::new();
        for topic in &a.topics {
            if topics_b.contains(topic.as_str()) && !shared.contains(topic) {
                shared.push(topic.clone());
            }
        }

        if !shared.is_empty() {
            let denominator = topics_a.len().max(topics_b.len()).max(1);
            let similarity = round_to(shared.len() as f64 / denominator as f64, 3) as f32;
            return Some(Candidate {
                source: a.id,
                target: b.id,
                kind: EdgeKind::Topic,
                weight: shared.len() as u32,
                similarity,
                shared_topics: shared,
            });
        }

        // Embedded pairs are judged on similarity alone
        if let (Some(ea), Some(eb)) = (a.embedding(), b.embedding()) {
            let similarity = cosine_similarity(ea, eb);
            return (similarity > self.config.semantic_threshold).then(|| Candidate {
                source: a.id,
                target: b.id,
                kind: EdgeKind::Semantic,
                weight: 1,
                similarity: round_to(f64::from(similarity), 3) as f32,
                shared_topics: Vec::new(),
            });
        }

        if a.content_type == b.content_type && a.has_known_content_type() {
            return Some(Candidate {
                source: a.id,
                target: b.id,
                kind: EdgeKind::ContentType,
                weight: 1,
                similarity: self.config.content_type_similarity,
                shared_topics: Vec::new(),
            });
        }

        None
    }
}

fn unassigned(item: &Item) -> ClusterAssignment {
    let name = item
        .topics
        .iter()
        .find(|t| !t.trim().is_empty())
        .map(|t| title_case(t))
        .unwrap_or_else(|| "General".to_string());
    ClusterAssignment::new(name, 0)
}
