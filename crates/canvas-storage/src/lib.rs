//! Storage layer for MindCanvas.
//!
//! Provides RocksDB-backed item storage with:
//! - Column family isolation for items and bookkeeping
//! - Zero-padded integer keys so iteration follows id order
//! - Monotonic id assignment recovered from the highest stored key
//! - Bulk snapshot reads for clustering and graph export

pub mod column_families;
pub mod db;
pub mod error;
pub mod keys;

pub use db::{Storage, StorageStats};
pub use error::StorageError;
pub use keys::ItemKey;
