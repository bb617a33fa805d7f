//! Oracle response parsing and validation.
//!
//! The completion text is loosely typed JSON. It is parsed into
//! [`OracleGraph`] entry by entry, rejecting malformed entries instead of
//! failing the whole response, and then validated against the input ids.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use canvas_types::ItemId;

use super::OracleError;
use crate::types::{Assignments, ClusterAssignment};

/// One oracle-chosen connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleEdge {
    pub source: ItemId,
    pub target: ItemId,
    pub reason: String,
}

/// Typed oracle output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OracleGraph {
    /// Item to cluster; cluster ids are 1-based positions in the response
    pub assignments: Assignments,
    pub edges: Vec<OracleEdge>,
    /// Number of cluster entries in the response
    pub cluster_count: usize,
}

impl OracleGraph {
    /// Keep only assignments for known items and edges between two distinct
    /// assigned items.
    pub fn validate(mut self, known_ids: &HashSet<ItemId>) -> Self {
        let before_assignments = self.assignments.len();
        self.assignments.retain(|id, _| known_ids.contains(id));

        let before_edges = self.edges.len();
        let assignments = &self.assignments;
        self.edges.retain(|e| {
            e.source != e.target
                && assignments.contains_key(&e.source)
                && assignments.contains_key(&e.target)
        });

        debug!(
            dropped_assignments = before_assignments - self.assignments.len(),
            dropped_edges = before_edges - self.edges.len(),
            "Validated oracle output"
        );
        self
    }

    /// Fraction of `total` items with an assignment.
    pub fn coverage(&self, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        self.assignments.len() as f64 / total as f64
    }
}

/// Parse completion text into an [`OracleGraph`].
///
/// Fails on text without a JSON object, a non-array `clusters` field, or an
/// empty cluster list. Individual malformed clusters, ids and edges are
/// skipped. When an id appears in several clusters the last one wins.
pub fn parse_response(text: &str) -> Result<OracleGraph, OracleError> {
    let json_str = extract_json(text);
    let value: Value = serde_json::from_str(&json_str)
        .map_err(|e| OracleError::ParseError(format!("Failed to parse oracle JSON: {}", e)))?;
    let root = value
        .as_object()
        .ok_or_else(|| OracleError::ParseError("response is not a JSON object".to_string()))?;

    let clusters: &[Value] = match root.get("clusters") {
        Some(Value::Array(list)) => list.as_slice(),
        Some(_) => {
            return Err(OracleError::ParseError(
                "clusters is not an array".to_string(),
            ))
        }
        None => &[],
    };
    if clusters.is_empty() {
        return Err(OracleError::EmptyClusters);
    }

    let mut graph = OracleGraph {
        cluster_count: clusters.len(),
        ..Default::default()
    };
    let mut rejected = 0usize;

    for (pos, entry) in clusters.iter().enumerate() {
        let cluster_id = pos as u32 + 1;
        let Some(cluster) = entry.as_object() else {
            rejected += 1;
            continue;
        };
        let Some(Value::Array(node_ids)) = cluster.get("node_ids") else {
            rejected += 1;
            continue;
        };
        let name = cluster
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Cluster {}", cluster_id));

        for raw in node_ids {
            match parse_id(raw) {
                Some(id) => {
                    graph
                        .assignments
                        .insert(id, ClusterAssignment::new(name.clone(), cluster_id));
                }
                None => rejected += 1,
            }
        }
    }

    if let Some(Value::Array(edges)) = root.get("edges") {
        for entry in edges {
            match parse_edge(entry) {
                Some(edge) => graph.edges.push(edge),
                None => rejected += 1,
            }
        }
    }

    debug!(
        clusters = graph.cluster_count,
        assigned = graph.assignments.len(),
        edges = graph.edges.len(),
        rejected,
        "Parsed oracle response"
    );
    Ok(graph)
}

/// Ids arrive as strings or numbers.
fn parse_id(value: &Value) -> Option<ItemId> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

fn parse_edge(value: &Value) -> Option<OracleEdge> {
    let edge = value.as_object()?;
    Some(OracleEdge {
        source: parse_id(edge.get("source")?)?,
        target: parse_id(edge.get("target")?)?,
        reason: edge
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string(),
    })
}

/// Extract JSON object from text (handles markdown code blocks).
fn extract_json(text: &str) -> String {
    // Check for markdown code block
    if let Some(start) = text.find("```json") {
        if let Some(end) = text[start + 7..].find("```") {
            return text[start + 7..start + 7 + end].trim().to_string();
        }
    }

    // Check for plain code block
    if let Some(start) = text.find("```") {
        if let Some(end) = text[start + 3..].find("```") {
            return text[start + 3..start + 3 + end].trim().to_string();
        }
    }

    // Find first { and last }
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return text[start..=end].to_string();
        }
    }

    text.to_string()
}
