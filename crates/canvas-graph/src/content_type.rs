//! Last-resort grouping by content type.

use std::collections::BTreeMap;

use tracing::info;

use canvas_types::Item;

use crate::density::{average_quality, ranked_topics};
use crate::types::ClusterSummary;

/// Groups items strictly by their `content_type` label.
#[derive(Debug, Clone)]
pub struct ContentTypeClusterer {
    top_topics: usize,
}

impl Default for ContentTypeClusterer {
    fn default() -> Self {
        Self { top_topics: 5 }
    }
}

impl ContentTypeClusterer {
    pub fn new(top_topics: usize) -> Self {
        Self { top_topics }
    }

    /// One cluster per content type, in order of first appearance.
    pub fn cluster(&self, items: &[Item]) -> Vec<ClusterSummary> {
        let mut groups: Vec<(&str, Vec<&Item>)> = Vec::new();
        for item in items {
            match groups
                .iter_mut()
                .find(|(t, _)| *t == item.content_type.as_str())
            {
                Some((_, group)) => group.push(item),
                None => groups.push((item.content_type.as_str(), vec![item])),
            }
        }

        let clusters: Vec<ClusterSummary> = groups
            .into_iter()
            .enumerate()
            .map(|(idx, (content_type, group))| {
                let mut content_types = BTreeMap::new();
                content_types.insert(content_type.to_string(), group.len());
                ClusterSummary {
                    id: idx as u32 + 1,
                    name: format!("{} Cluster", content_type),
                    description: format!(
                        "{} {} items",
                        group.len(),
                        content_type.to_lowercase()
                    ),
                    content_count: group.len(),
                    top_topics: ranked_topics(&group, self.top_topics),
                    average_quality: average_quality(&group),
                    content_types,
                    items: group.iter().map(|i| i.id).collect(),
                    representative_title: group
                        .first()
                        .map(|i| i.title.clone())
                        .unwrap_or_default(),
                }
            })
            .collect();

        info!(clusters = clusters.len(), "Content-type clustering complete");
        clusters
    }
}
