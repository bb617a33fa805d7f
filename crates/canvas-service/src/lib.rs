//! # canvas-service
//!
//! Async service facade for MindCanvas.
//!
//! Provides:
//! - Graph export (clustered and general) and cluster summaries
//! - Related items and semantic search
//! - Trending topics, analytics, recommendations and stats
//! - Reindex, import and reset
//!
//! Storage is read through blocking tasks; graph work runs on the snapshot.

pub mod error;
pub mod insights;
pub mod service;

pub use error::ServiceError;
pub use insights::{Analytics, CollectionStats, Recommendation, TrendingTopic};
pub use service::{ImportReport, KnowledgeService, ReindexReport};
