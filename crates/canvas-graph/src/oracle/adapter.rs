//! Bridges the oracle to the graph pipeline.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use canvas_types::{Item, ItemId};

use super::prompt::build_prompt;
use super::response::{parse_response, OracleEdge};
use super::{GraphOracle, OracleError};
use crate::config::OracleGraphConfig;
use crate::topic_cluster::TopicFrequencyClusterer;
use crate::types::{Assignments, ClusterAssignment};

/// Accepted oracle output with every input item assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OracleClustering {
    pub assignments: Assignments,
    pub edges: Vec<OracleEdge>,
}

/// Asks the oracle for clusters and edges and decides whether to trust it.
pub struct GraphOracleAdapter {
    oracle: Option<Arc<dyn GraphOracle>>,
    config: OracleGraphConfig,
    timeout: Duration,
}

impl GraphOracleAdapter {
    pub fn new(
        oracle: Option<Arc<dyn GraphOracle>>,
        config: OracleGraphConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            oracle,
            config,
            timeout,
        }
    }

    /// Adapter that never consults an oracle.
    pub fn disabled() -> Self {
        Self::new(None, OracleGraphConfig::default(), Duration::from_secs(60))
    }

    pub fn is_enabled(&self) -> bool {
        self.oracle.is_some()
    }

    /// Cluster `items` through the oracle.
    ///
    /// Returns `None` when the oracle is absent, fails, times out, or
    /// assigns fewer than `acceptance_ratio` of the items. Items it skipped
    /// are placed by `fallback` run over just the leftovers.
    #[instrument(skip_all, fields(items = items.len()))]
    pub async fn cluster(
        &self,
        items: &[Item],
        fallback: &TopicFrequencyClusterer,
    ) -> Option<OracleClustering> {
        let oracle = self.oracle.as_ref()?;
        if items.is_empty() {
            return None;
        }

        let prompt = build_prompt(items, &self.config);
        let text = match tokio::time::timeout(self.timeout, oracle.complete(&prompt)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(error = %e, "Oracle request failed");
                return None;
            }
            Err(_) => {
                warn!(error = %OracleError::Timeout, timeout = ?self.timeout, "Oracle request timed out");
                return None;
            }
        };

        let parsed = match parse_response(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Discarding oracle response");
                return None;
            }
        };

        let known: HashSet<ItemId> = items.iter().map(|item| item.id).collect();
        let graph = parsed.validate(&known);
        let coverage = graph.coverage(items.len());
        if coverage < self.config.acceptance_ratio {
            warn!(
                assigned = graph.assignments.len(),
                total = items.len(),
                coverage,
                "Oracle coverage below acceptance ratio"
            );
            return None;
        }

        let mut assignments = graph.assignments;
        let leftovers: Vec<Item> = items
            .iter()
            .filter(|item| !assignments.contains_key(&item.id))
            .cloned()
            .collect();

        if !leftovers.is_empty() {
            let offset = assignments
                .values()
                .map(|a| a.cluster_id)
                .max()
                .unwrap_or(0);
            for (id, assignment) in fallback.cluster(&leftovers) {
                assignments.insert(
                    id,
                    ClusterAssignment::new(assignment.cluster_name, assignment.cluster_id + offset),
                );
            }
        }

        info!(
            assigned = assignments.len(),
            gap_filled = leftovers.len(),
            edges = graph.edges.len(),
            "Oracle clustering accepted"
        );

        Some(OracleClustering {
            assignments,
            edges: graph.edges,
        })
    }
}
