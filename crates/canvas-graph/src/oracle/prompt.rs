//! Oracle request construction.

use serde::Serialize;

use canvas_types::Item;

use crate::config::OracleGraphConfig;

/// What the oracle sees of one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDescriptor {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub topics: Vec<String>,
    #[serde(rename = "type")]
    pub content_type: String,
}

impl NodeDescriptor {
    pub fn from_item(item: &Item, config: &OracleGraphConfig) -> Self {
        Self {
            id: item.id.to_string(),
            title: item.title.clone(),
            summary: truncate_chars(&item.summary, config.summary_chars)
                .trim()
                .to_string(),
            topics: item.topics.iter().take(config.max_topics).cloned().collect(),
            content_type: item.content_type.clone(),
        }
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Build the clustering and edge-selection prompt.
pub fn build_prompt(items: &[Item], config: &OracleGraphConfig) -> String {
    let descriptors: Vec<NodeDescriptor> = items
        .iter()
        .map(|item| NodeDescriptor::from_item(item, config))
        .collect();
    let nodes_json = serde_json::to_string_pretty(&descriptors).unwrap_or_else(|_| "[]".into());

    format!(
        r#"You are a knowledge graph architect. Given these content nodes, decide:
1. How to cluster them into meaningful semantic groups.
2. Which pairs of nodes should be connected by an edge.

CLUSTERING RULES:
- Create 3-12 clusters based on distinct themes.
- Cluster name: short label (2-4 words), e.g. "Python Programming", "Machine Learning".
- Every node must be in exactly one cluster.
- Base decisions on title + summary, not just keywords.
- Closely related nodes (e.g. two Python tutorials) MUST share a cluster.

EDGE RULES:
- Only connect nodes that share a meaningful semantic relationship.
- Aim for 2-4 edges per node on average, neither sparse nor a hairball.
- Prefer connecting nodes within the same cluster, but cross-cluster edges are fine when genuinely related.
- Do NOT add edges just because nodes share a generic topic like "programming" or "learning".
- Each edge must have a short reason (5-10 words).

Nodes:
{nodes_json}

Respond with a single JSON object:
{{
  "clusters": [
    {{
      "name": "Cluster Name",
      "node_ids": ["1", "5", "12"]
    }}
  ],
  "edges": [
    {{
      "source": "1",
      "target": "5",
      "reason": "Both cover Python data structures"
    }}
  ]
}}"#
    )
}
