//! Storage errors.

use thiserror::Error;

use canvas_types::ItemId;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// The database was opened without one of the expected column families
    #[error("Missing column family '{0}'")]
    MissingColumnFamily(&'static str),

    /// A stored key or counter could not be decoded
    #[error("Corrupt key: {0}")]
    Key(String),

    /// An item record could not be encoded or decoded
    #[error("Item encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("No item with id {0}")]
    NotFound(ItemId),
}
