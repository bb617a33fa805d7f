//! Export pipelines.
//!
//! Each call works on a snapshot of items fetched by the caller. Stages
//! degrade to the next-weaker strategy instead of failing.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use canvas_types::{Item, ItemId};

use crate::assembler::GraphAssembler;
use crate::config::GraphConfig;
use crate::content_type::ContentTypeClusterer;
use crate::density::{sort_summaries, summarize_group, DensityClusterer, DensityOutcome};
use crate::oracle::{GraphOracle, GraphOracleAdapter};
use crate::topic_cluster::TopicFrequencyClusterer;
use crate::types::{ClusterMethod, ClusterSummary, Graph};

/// Runs clustering strategies and assembles export graphs.
pub struct GraphExporter {
    adapter: GraphOracleAdapter,
    topics: TopicFrequencyClusterer,
    density: DensityClusterer,
    content_types: ContentTypeClusterer,
    assembler: GraphAssembler,
    min_items_for_summary: usize,
    top_topics: usize,
}

impl GraphExporter {
    pub fn new(
        config: &GraphConfig,
        oracle: Option<Arc<dyn GraphOracle>>,
        oracle_timeout: Duration,
    ) -> Self {
        Self {
            adapter: GraphOracleAdapter::new(oracle, config.oracle.clone(), oracle_timeout),
            topics: TopicFrequencyClusterer::new(config.topics.clone()),
            density: DensityClusterer::new(config.density.clone()),
            content_types: ContentTypeClusterer::new(config.density.top_topics),
            assembler: GraphAssembler::new(config.edges.clone()),
            min_items_for_summary: config.density.min_embedded_items,
            top_topics: config.density.top_topics,
        }
    }

    /// Exporter with default settings and no oracle.
    pub fn offline() -> Self {
        Self::new(&GraphConfig::default(), None, Duration::from_secs(60))
    }

    pub fn oracle_enabled(&self) -> bool {
        self.adapter.is_enabled()
    }

    /// Clustered graph: oracle first, topic frequency otherwise.
    #[instrument(skip_all, fields(items = items.len()))]
    pub async fn export_clustered(&self, items: &[Item]) -> Graph {
        if items.is_empty() {
            info!("No items to export");
            return Graph::empty();
        }

        if let Some(result) = self.adapter.cluster(items, &self.topics).await {
            return self.assembler.cluster_graph(
                items,
                &result.assignments,
                ClusterMethod::Oracle,
                &result.edges,
            );
        }

        let assignments = self.topics.cluster(items);
        self.assembler
            .cluster_graph(items, &assignments, ClusterMethod::TopicSpecificity, &[])
    }

    /// Unclustered graph with pairwise edges.
    pub fn export_all(&self, items: &[Item]) -> Graph {
        self.assembler.general_graph(items)
    }

    /// Density cluster summaries, falling back to content-type groups.
    ///
    /// Collections smaller than the density minimum yield no clusters.
    #[instrument(skip_all, fields(items = items.len()))]
    pub fn cluster_summaries(&self, items: &[Item]) -> Vec<ClusterSummary> {
        if items.len() < self.min_items_for_summary {
            warn!(
                items = items.len(),
                required = self.min_items_for_summary,
                "Insufficient data for clustering"
            );
            return Vec::new();
        }

        match self.density.cluster(items) {
            Ok(outcome) => self.merge_leftovers(items, outcome),
            Err(e) => {
                warn!(error = %e, "Density clustering unavailable, grouping by content type");
                self.content_types.cluster(items)
            }
        }
    }

    /// Place items density clustering left out with topic clustering over
    /// just those items. Ids continue past the density ids.
    fn merge_leftovers(&self, items: &[Item], outcome: DensityOutcome) -> Vec<ClusterSummary> {
        let DensityOutcome {
            mut clusters,
            unclustered,
        } = outcome;
        if unclustered.is_empty() {
            return clusters;
        }

        let unclustered: HashSet<ItemId> = unclustered.into_iter().collect();
        let leftovers: Vec<Item> = items
            .iter()
            .filter(|item| unclustered.contains(&item.id))
            .cloned()
            .collect();
        let assignments = self.topics.cluster(&leftovers);
        let offset = clusters.iter().map(|c| c.id).max().unwrap_or(0);

        // Groups in order of first member
        let mut groups: Vec<(u32, &str, Vec<&Item>)> = Vec::new();
        for item in &leftovers {
            let Some(assignment) = assignments.get(&item.id) else {
                continue;
            };
            match groups
                .iter_mut()
                .find(|(id, _, _)| *id == assignment.cluster_id)
            {
                Some((_, _, group)) => group.push(item),
                None => groups.push((
                    assignment.cluster_id,
                    assignment.cluster_name.as_str(),
                    vec![item],
                )),
            }
        }

        info!(
            leftovers = leftovers.len(),
            clusters = groups.len(),
            "Merged unclustered items by topic"
        );
        clusters.extend(groups.into_iter().map(|(id, name, group)| {
            summarize_group(id + offset, name.to_string(), &group, self.top_topics)
        }));
        sort_summaries(&mut clusters);
        clusters
    }
}
