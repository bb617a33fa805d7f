//! # canvas-graph
//!
//! Clustering and knowledge-graph assembly for MindCanvas.
//!
//! Items become nodes; clusters come from an external oracle when one is
//! configured and accepted, from topic frequency otherwise. Edges come from
//! the oracle, cluster membership, or pairwise topic, embedding and
//! content-type evidence.
//!
//! ## Features
//! - Topic normalization with prefix and first-word collapse
//! - Topic-frequency clustering with singleton repair
//! - DBSCAN (default) or HDBSCAN density clustering over embeddings
//! - Oracle adapter with parse-then-validate boundary and gap filling
//! - Related items and semantic search by cosine similarity
//!
//! ## Usage
//!
//! ```rust
//! use canvas_graph::GraphAssembler;
//! use canvas_types::Item;
//!
//! let items = vec![
//!     Item::new(1, "Ownership").with_topics(["Rust"]),
//!     Item::new(2, "Borrowing").with_topics(["Rust"]),
//! ];
//! let graph = GraphAssembler::default().general_graph(&items);
//! assert_eq!(graph.edges.len(), 1);
//! ```

pub mod assembler;
pub mod config;
pub mod content_type;
pub mod density;
pub mod error;
pub mod export;
pub mod normalizer;
pub mod oracle;
pub mod related;
pub mod similarity;
pub mod topic_cluster;
pub mod types;

pub use assembler::GraphAssembler;
pub use config::{
    DensityAlgorithm, DensityConfig, EdgeConfig, GraphConfig, OracleGraphConfig, RelatedConfig,
    SearchConfig, TopicClusterConfig,
};
pub use content_type::ContentTypeClusterer;
pub use density::{dbscan, DensityClusterer, DensityOutcome};
pub use error::GraphError;
pub use export::GraphExporter;
pub use normalizer::{title_case, TopicNormalizer};
pub use oracle::{
    ApiOracle, ApiOracleConfig, GraphOracle, GraphOracleAdapter, MockOracle, OracleClustering,
    OracleEdge, OracleError,
};
pub use related::{RelatedItem, RelatedItemFinder, SearchHit};
pub use similarity::{cosine_similarity, normalize, pairwise_distances};
pub use topic_cluster::{members_by_cluster, TopicFrequencyClusterer};
pub use types::{
    Assignments, ClusterAssignment, ClusterMethod, ClusterSummary, EdgeKind, EdgeTypeCounts,
    Graph, GraphEdge, GraphMetadata, GraphNode,
};
