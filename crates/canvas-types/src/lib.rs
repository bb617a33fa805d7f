//! # canvas-types
//!
//! Shared domain types for the MindCanvas knowledge graph.
//!
//! This crate defines the core data structures used throughout the system:
//! - Items: processed browsing-history records (title, summary, topics, embedding)
//! - Settings: layered configuration for the CLI and service
//! - CanvasError: shared error type
//!
//! ## Usage
//!
//! ```rust
//! use canvas_types::Item;
//!
//! let item = Item::new(1, "Rust Ownership").with_topics(["Rust", "Memory"]);
//! assert_eq!(item.topics.len(), 2);
//! ```

pub mod config;
pub mod error;
pub mod item;

pub use config::{EmbeddingSettings, OracleSettings, Settings};
pub use error::CanvasError;
pub use item::{Item, ItemId, NewItem, DEFAULT_QUALITY_SCORE, UNKNOWN_CONTENT_TYPE};
