//! Graph configuration.
//!
//! Loaded from the `graph` section of the layered settings.

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Master configuration for clustering and graph assembly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Density clustering settings
    #[serde(default)]
    pub density: DensityConfig,

    /// Topic-frequency clustering settings
    #[serde(default)]
    pub topics: TopicClusterConfig,

    /// Oracle acceptance and request shaping
    #[serde(default)]
    pub oracle: OracleGraphConfig,

    /// Edge construction settings
    #[serde(default)]
    pub edges: EdgeConfig,

    /// Related-item lookup settings
    #[serde(default)]
    pub related: RelatedConfig,

    /// Semantic search settings
    #[serde(default)]
    pub search: SearchConfig,
}

impl GraphConfig {
    /// Reject values that would make clustering or capping meaningless.
    pub fn validate(&self) -> Result<(), GraphError> {
        let d = &self.density;
        if !(d.epsilon > 0.0 && d.epsilon <= 2.0) {
            return Err(GraphError::InvalidConfig(format!(
                "density.epsilon must be in (0, 2], got {}",
                d.epsilon
            )));
        }
        if d.min_samples == Some(0) {
            return Err(GraphError::InvalidConfig(
                "density.min_samples must be positive".to_string(),
            ));
        }
        if d.min_cluster_members < 2 {
            return Err(GraphError::InvalidConfig(
                "density.min_cluster_members must be at least 2".to_string(),
            ));
        }

        let t = &self.topics;
        if t.min_support < 2 {
            return Err(GraphError::InvalidConfig(
                "topics.min_support must be at least 2".to_string(),
            ));
        }
        if !(t.max_support_ratio > 0.0 && t.max_support_ratio <= 1.0) {
            return Err(GraphError::InvalidConfig(format!(
                "topics.max_support_ratio must be in (0, 1], got {}",
                t.max_support_ratio
            )));
        }

        if !(self.oracle.acceptance_ratio > 0.0 && self.oracle.acceptance_ratio <= 1.0) {
            return Err(GraphError::InvalidConfig(format!(
                "oracle.acceptance_ratio must be in (0, 1], got {}",
                self.oracle.acceptance_ratio
            )));
        }

        if self.edges.total_cap_factor == 0 {
            return Err(GraphError::InvalidConfig(
                "edges.total_cap_factor must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Which density algorithm to run over embeddings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityAlgorithm {
    #[default]
    Dbscan,
    Hdbscan,
}

/// Density clustering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DensityConfig {
    #[serde(default)]
    pub algorithm: DensityAlgorithm,

    /// DBSCAN neighborhood radius in cosine distance
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// Fixed neighborhood size; adaptive when unset
    #[serde(default)]
    pub min_samples: Option<usize>,

    /// Fewer usable embeddings than this and density clustering is skipped
    #[serde(default = "default_min_embedded_items")]
    pub min_embedded_items: usize,

    /// Smaller clusters are treated as unclustered
    #[serde(default = "default_min_cluster_members")]
    pub min_cluster_members: usize,

    /// Number of topics listed per cluster summary
    #[serde(default = "default_top_topics")]
    pub top_topics: usize,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            algorithm: DensityAlgorithm::default(),
            epsilon: default_epsilon(),
            min_samples: None,
            min_embedded_items: default_min_embedded_items(),
            min_cluster_members: default_min_cluster_members(),
            top_topics: default_top_topics(),
        }
    }
}

impl DensityConfig {
    /// Neighborhood size for `n` clustered items.
    ///
    /// Adaptive rule: `max(2, min(4, n / 8))`.
    pub fn min_samples_for(&self, n: usize) -> usize {
        self.min_samples.unwrap_or_else(|| (n / 8).clamp(2, 4))
    }
}

fn default_epsilon() -> f64 {
    0.4
}
fn default_min_embedded_items() -> usize {
    3
}
fn default_min_cluster_members() -> usize {
    2
}
fn default_top_topics() -> usize {
    5
}

/// Topic-frequency clustering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicClusterConfig {
    /// Minimum distinct-item count for a group-forming topic
    #[serde(default = "default_min_support")]
    pub min_support: usize,

    /// Topics in more than this share of items are too generic to group on
    #[serde(default = "default_max_support_ratio")]
    pub max_support_ratio: f64,
}

impl Default for TopicClusterConfig {
    fn default() -> Self {
        Self {
            min_support: default_min_support(),
            max_support_ratio: default_max_support_ratio(),
        }
    }
}

impl TopicClusterConfig {
    /// Upper item-count bound for group-forming topics over `n` items.
    pub fn max_support_for(&self, n: usize) -> usize {
        let ratio_bound = (n as f64 * self.max_support_ratio).floor() as usize;
        ratio_bound.max(self.min_support)
    }
}

fn default_min_support() -> usize {
    2
}
fn default_max_support_ratio() -> f64 {
    0.70
}

/// Oracle request shaping and acceptance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleGraphConfig {
    /// Minimum share of input items the oracle must assign
    #[serde(default = "default_acceptance_ratio")]
    pub acceptance_ratio: f64,

    /// Summary characters sent per node
    #[serde(default = "default_summary_chars")]
    pub summary_chars: usize,

    /// Topics sent per node
    #[serde(default = "default_max_topics")]
    pub max_topics: usize,
}

impl Default for OracleGraphConfig {
    fn default() -> Self {
        Self {
            acceptance_ratio: default_acceptance_ratio(),
            summary_chars: default_summary_chars(),
            max_topics: default_max_topics(),
        }
    }
}

fn default_acceptance_ratio() -> f64 {
    0.5
}
fn default_summary_chars() -> usize {
    120
}
fn default_max_topics() -> usize {
    5
}

/// Edge construction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// Cosine similarity a pair must exceed for a semantic edge
    #[serde(default = "default_semantic_threshold")]
    pub semantic_threshold: f32,

    /// Fixed similarity of content-type edges
    #[serde(default = "default_weak_similarity")]
    pub content_type_similarity: f32,

    /// Content-type edges are limited to this many per node
    #[serde(default = "default_content_type_cap_factor")]
    pub content_type_cap_factor: usize,

    /// Final edge list is limited to this many per node
    #[serde(default = "default_total_cap_factor")]
    pub total_cap_factor: usize,

    /// Similarity of complete-subgraph edges within a cluster
    #[serde(default = "default_weak_similarity")]
    pub cluster_similarity: f32,

    #[serde(default = "default_oracle_same_cluster_similarity")]
    pub oracle_same_cluster_similarity: f32,

    #[serde(default = "default_oracle_cross_cluster_similarity")]
    pub oracle_cross_cluster_similarity: f32,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            semantic_threshold: default_semantic_threshold(),
            content_type_similarity: default_weak_similarity(),
            content_type_cap_factor: default_content_type_cap_factor(),
            total_cap_factor: default_total_cap_factor(),
            cluster_similarity: default_weak_similarity(),
            oracle_same_cluster_similarity: default_oracle_same_cluster_similarity(),
            oracle_cross_cluster_similarity: default_oracle_cross_cluster_similarity(),
        }
    }
}

fn default_semantic_threshold() -> f32 {
    0.5
}
fn default_weak_similarity() -> f32 {
    0.3
}
fn default_content_type_cap_factor() -> usize {
    2
}
fn default_total_cap_factor() -> usize {
    3
}
fn default_oracle_same_cluster_similarity() -> f32 {
    0.8
}
fn default_oracle_cross_cluster_similarity() -> f32 {
    0.5
}

/// Related-item lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedConfig {
    /// Similarity a neighbor must exceed
    #[serde(default = "default_related_threshold")]
    pub threshold: f32,

    #[serde(default = "default_related_limit")]
    pub limit: usize,
}

impl Default for RelatedConfig {
    fn default() -> Self {
        Self {
            threshold: default_related_threshold(),
            limit: default_related_limit(),
        }
    }
}

fn default_related_threshold() -> f32 {
    0.3
}
fn default_related_limit() -> usize {
    10
}

/// Semantic search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Minimum similarity (inclusive) for a search hit
    #[serde(default = "default_related_threshold")]
    pub threshold: f32,

    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: default_related_threshold(),
            limit: default_search_limit(),
        }
    }
}

fn default_search_limit() -> usize {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_defaults() {
        let config = DensityConfig::default();
        assert_eq!(config.algorithm, DensityAlgorithm::Dbscan);
        assert!((config.epsilon - 0.4).abs() < f64::EPSILON);
        assert_eq!(config.min_embedded_items, 3);
        assert_eq!(config.min_cluster_members, 2);
    }

    #[test]
    fn test_adaptive_min_samples() {
        let config = DensityConfig::default();
        assert_eq!(config.min_samples_for(3), 2);
        assert_eq!(config.min_samples_for(16), 2);
        assert_eq!(config.min_samples_for(24), 3);
        assert_eq!(config.min_samples_for(32), 4);
        assert_eq!(config.min_samples_for(1000), 4);

        let fixed = DensityConfig {
            min_samples: Some(5),
            ..Default::default()
        };
        assert_eq!(fixed.min_samples_for(1000), 5);
    }

    #[test]
    fn test_max_support() {
        let config = TopicClusterConfig::default();
        assert_eq!(config.max_support_for(3), 2);
        assert_eq!(config.max_support_for(10), 7);
        assert_eq!(config.max_support_for(1), 2);
    }

    #[test]
    fn test_edge_defaults() {
        let config = EdgeConfig::default();
        assert!((config.semantic_threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.content_type_cap_factor, 2);
        assert_eq!(config.total_cap_factor, 3);
        assert!((config.oracle_same_cluster_similarity - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_validate_defaults_ok() {
        assert!(GraphConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = GraphConfig::default();
        config.density.epsilon = 0.0;
        assert!(config.validate().is_err());

        let mut config = GraphConfig::default();
        config.oracle.acceptance_ratio = 1.5;
        assert!(config.validate().is_err());

        let mut config = GraphConfig::default();
        config.topics.min_support = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let json = r#"{"density": {"algorithm": "hdbscan", "epsilon": 0.3}}"#;
        let config: GraphConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.density.algorithm, DensityAlgorithm::Hdbscan);
        assert!((config.density.epsilon - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.related.limit, 10);
        assert_eq!(config.search.limit, 20);
    }
}
