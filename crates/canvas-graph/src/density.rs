//! Density clustering over item embeddings.
//!
//! DBSCAN with cosine distance by default; HDBSCAN (via the `hdbscan` crate,
//! Euclidean over unit vectors) when configured. Only items whose embedding
//! matches the first-seen dimension take part.

use std::collections::BTreeMap;

use hdbscan::{Hdbscan, HdbscanHyperParams};
use tracing::{debug, info, instrument};

use canvas_types::{Item, ItemId};

use crate::config::{DensityAlgorithm, DensityConfig};
use crate::error::GraphError;
use crate::normalizer::title_case;
use crate::similarity::{normalize, pairwise_distances, round_to};
use crate::types::ClusterSummary;

/// Label for points outside every cluster.
const NOISE: i32 = -1;

/// Result of a density pass.
#[derive(Debug, Clone, Default)]
pub struct DensityOutcome {
    /// Surviving clusters, largest first
    pub clusters: Vec<ClusterSummary>,
    /// Items in no surviving cluster (noise, tiny clusters, unusable embeddings)
    pub unclustered: Vec<ItemId>,
}

/// Groups items by embedding density.
#[derive(Debug, Clone, Default)]
pub struct DensityClusterer {
    config: DensityConfig,
}

impl DensityClusterer {
    pub fn new(config: DensityConfig) -> Self {
        Self { config }
    }

    /// Cluster items by embedding.
    ///
    /// Returns `GraphError::InsufficientEmbeddings` when fewer than
    /// `min_embedded_items` items carry usable embeddings; the caller then
    /// falls back to content-type grouping.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub fn cluster(&self, items: &[Item]) -> Result<DensityOutcome, GraphError> {
        let mut dimension: Option<usize> = None;
        let mut members: Vec<&Item> = Vec::new();
        let mut vectors: Vec<Vec<f32>> = Vec::new();
        let mut unclustered: Vec<ItemId> = Vec::new();

        for item in items {
            match item.embedding() {
                Some(embedding) => {
                    let dim = *dimension.get_or_insert(embedding.len());
                    if embedding.len() == dim {
                        let mut v = embedding.to_vec();
                        normalize(&mut v);
                        members.push(item);
                        vectors.push(v);
                    } else {
                        unclustered.push(item.id);
                    }
                }
                None => unclustered.push(item.id),
            }
        }

        if vectors.len() < self.config.min_embedded_items {
            return Err(GraphError::InsufficientEmbeddings {
                found: vectors.len(),
                required: self.config.min_embedded_items,
            });
        }

        let min_samples = self.config.min_samples_for(vectors.len());
        let labels = match self.config.algorithm {
            DensityAlgorithm::Dbscan => {
                let distances = pairwise_distances(&vectors);
                dbscan(&distances, self.config.epsilon, min_samples)
            }
            DensityAlgorithm::Hdbscan => {
                let hyper_params = HdbscanHyperParams::builder()
                    .min_cluster_size(self.config.min_cluster_members)
                    .min_samples(min_samples)
                    .build();
                Hdbscan::new(&vectors, hyper_params)
                    .cluster()
                    .map_err(|e| GraphError::Clustering(format!("{:?}", e)))?
            }
        };

        // Group by label in order of first appearance
        let mut groups: Vec<(i32, Vec<&Item>)> = Vec::new();
        for (item, &label) in members.iter().copied().zip(labels.iter()) {
            if label == NOISE {
                unclustered.push(item.id);
                continue;
            }
            match groups.iter_mut().find(|(l, _)| *l == label) {
                Some((_, group)) => group.push(item),
                None => groups.push((label, vec![item])),
            }
        }

        let mut clusters = Vec::with_capacity(groups.len());
        for (label, group) in groups {
            if group.len() < self.config.min_cluster_members {
                unclustered.extend(group.iter().map(|i| i.id));
                continue;
            }
            clusters.push(self.summarize(label, &group));
        }

        sort_summaries(&mut clusters);

        info!(
            algorithm = ?self.config.algorithm,
            clusters = clusters.len(),
            unclustered = unclustered.len(),
            "Density clustering complete"
        );

        Ok(DensityOutcome {
            clusters,
            unclustered,
        })
    }

    fn summarize(&self, label: i32, group: &[&Item]) -> ClusterSummary {
        let id = (label + 1) as u32;
        let top_topics = ranked_topics(group, self.config.top_topics);

        let name = match top_topics.as_slice() {
            [first, second, ..] => format!("{} & {}", title_case(first), title_case(second)),
            [only] => title_case(only),
            [] => format!("Cluster {}", id),
        };

        summarize_group(id, name, group, self.config.top_topics)
    }
}

/// Largest first, then higher average quality. Stable.
pub(crate) fn sort_summaries(clusters: &mut [ClusterSummary]) {
    clusters.sort_by(|a, b| {
        b.content_count
            .cmp(&a.content_count)
            .then_with(|| b.average_quality.total_cmp(&a.average_quality))
    });
}

/// Summary of one group of items under a chosen id and name.
pub(crate) fn summarize_group(
    id: u32,
    name: String,
    group: &[&Item],
    top_topics: usize,
) -> ClusterSummary {
    let dominant = dominant_content_type(group);
    debug!(cluster_id = id, name = %name, members = group.len(), "Summarized cluster");

    ClusterSummary {
        id,
        description: format!("{} items - {}", group.len(), dominant),
        name,
        content_count: group.len(),
        top_topics: ranked_topics(group, top_topics),
        average_quality: average_quality(group),
        content_types: content_type_counts(group),
        items: group.iter().map(|i| i.id).collect(),
        representative_title: group.first().map(|i| i.title.clone()).unwrap_or_default(),
    }
}

/// Classic DBSCAN over a precomputed distance matrix.
///
/// Neighborhoods include the point itself. Clusters are labelled from 0 in
/// order of their lowest-index core point; unreached points keep `NOISE`.
pub fn dbscan(distances: &[Vec<f64>], epsilon: f64, min_samples: usize) -> Vec<i32> {
    let n = distances.len();
    let neighbors: Vec<Vec<usize>> = distances
        .iter()
        .map(|row| (0..n).filter(|&j| row[j] <= epsilon).collect())
        .collect();
    let is_core: Vec<bool> = neighbors.iter().map(|nb| nb.len() >= min_samples).collect();

    let mut labels = vec![NOISE; n];
    let mut next_label = 0;

    for start in 0..n {
        if labels[start] != NOISE || !is_core[start] {
            continue;
        }
        let mut stack = vec![start];
        while let Some(point) = stack.pop() {
            if labels[point] != NOISE {
                continue;
            }
            labels[point] = next_label;
            if is_core[point] {
                stack.extend(neighbors[point].iter().filter(|&&q| labels[q] == NOISE));
            }
        }
        next_label += 1;
    }

    labels
}

/// Raw topics of a group by frequency, ties in first-seen order.
pub(crate) fn ranked_topics(group: &[&Item], limit: usize) -> Vec<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for item in group {
        for topic in &item.topics {
            match counts.iter_mut().find(|(t, _)| *t == topic.as_str()) {
                Some((_, c)) => *c += 1,
                None => counts.push((topic.as_str(), 1)),
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(t, _)| t.to_string())
        .collect()
}

/// Mean quality score rounded to one decimal.
pub(crate) fn average_quality(group: &[&Item]) -> f64 {
    if group.is_empty() {
        return 0.0;
    }
    let sum: u32 = group.iter().map(|i| u32::from(i.quality_score)).sum();
    round_to(f64::from(sum) / group.len() as f64, 1)
}

pub(crate) fn content_type_counts(group: &[&Item]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for item in group {
        *counts.entry(item.content_type.clone()).or_insert(0) += 1;
    }
    counts
}

/// Most common content type, ties in first-seen order.
fn dominant_content_type(group: &[&Item]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for item in group {
        match counts.iter_mut().find(|(t, _)| *t == item.content_type) {
            Some((_, c)) => *c += 1,
            None => counts.push((item.content_type.as_str(), 1)),
        }
    }
    // max_by_key keeps the last maximum; scan by hand to keep the first
    let mut best: Option<(&str, usize)> = None;
    for (t, c) in counts {
        if best.map_or(true, |(_, bc)| c > bc) {
            best = Some((t, c));
        }
    }
    best.map(|(t, _)| t.to_string())
        .unwrap_or_else(|| "Mixed".to_string())
}
