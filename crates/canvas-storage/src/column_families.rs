//! Column family definitions for RocksDB.
//!
//! - items: processed content records keyed by id (Zstd compressed)
//! - meta: counters and bookkeeping (default compaction)

use rocksdb::{ColumnFamilyDescriptor, Options};

/// Column family name for item records
pub const CF_ITEMS: &str = "items";

/// Column family name for bookkeeping values
pub const CF_META: &str = "meta";

/// All column family names
pub const ALL_CF_NAMES: &[&str] = &[CF_ITEMS, CF_META];

/// Items carry summaries and 384-float embeddings; compress them.
fn items_options() -> Options {
    let mut opts = Options::default();
    opts.set_compression_type(rocksdb::DBCompressionType::Zstd);
    opts
}

/// Build all column family descriptors
pub fn build_cf_descriptors() -> Vec<ColumnFamilyDescriptor> {
    vec![
        ColumnFamilyDescriptor::new(CF_ITEMS, items_options()),
        ColumnFamilyDescriptor::new(CF_META, Options::default()),
    ]
}
