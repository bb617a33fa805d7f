//! RocksDB wrapper for MindCanvas item storage.
//!
//! Provides:
//! - Database open with column family setup
//! - Id assignment for newly stored items
//! - Single-key reads and full snapshot scans
//! - Embedding write-back for reindexing

use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{debug, info};

use canvas_types::{Item, ItemId, NewItem};

use crate::column_families::{build_cf_descriptors, CF_ITEMS, CF_META};
use crate::error::StorageError;
use crate::keys::ItemKey;

/// Meta key holding the next id to hand out
const NEXT_ID_KEY: &[u8] = b"next_item_id";

/// Summary counts over the stored collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageStats {
    /// Total stored items
    pub item_count: usize,
    /// Items carrying a non-empty embedding
    pub embedded_count: usize,
}

/// Main storage interface for MindCanvas
pub struct Storage {
    db: DB,
    /// Next id handed out by `put_new_item`
    next_id: AtomicI64,
}

impl Storage {
    /// Open storage at the given path, creating if necessary
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening storage at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_background_jobs(4);

        let cf_descriptors = build_cf_descriptors();
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        let next_id = Self::load_next_id(&db)?;
        debug!(next_id, "Recovered item id counter");

        Ok(Self {
            db,
            next_id: AtomicI64::new(next_id),
        })
    }

    /// Recover the id counter: the persisted value or one past the highest
    /// stored id, whichever is larger.
    fn load_next_id(db: &DB) -> Result<i64, StorageError> {
        let meta = db
            .cf_handle(CF_META)
            .ok_or_else(|| StorageError::MissingColumnFamily(CF_META))?;
        let persisted = match db.get_cf(&meta, NEXT_ID_KEY)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    StorageError::Key(format!("bad id counter length: {}", bytes.len()))
                })?;
                i64::from_be_bytes(raw)
            }
            None => 1,
        };

        let cf = db
            .cf_handle(CF_ITEMS)
            .ok_or_else(|| StorageError::MissingColumnFamily(CF_ITEMS))?;
        let mut iter = db.iterator_cf(&cf, IteratorMode::End);
        let from_keys = match iter.next() {
            Some(result) => {
                let (key, _) = result?;
                ItemKey::from_bytes(&key)?.id + 1
            }
            None => 1,
        };

        Ok(persisted.max(from_keys))
    }

    fn meta_cf(&self) -> Result<&rocksdb::ColumnFamily, StorageError> {
        self.db
            .cf_handle(CF_META)
            .ok_or_else(|| StorageError::MissingColumnFamily(CF_META))
    }

    /// Add the current counter to a batch.
    fn persist_next_id(&self, batch: &mut WriteBatch) -> Result<(), StorageError> {
        let next = self.next_id.load(Ordering::SeqCst);
        batch.put_cf(self.meta_cf()?, NEXT_ID_KEY, next.to_be_bytes());
        Ok(())
    }

    fn items_cf(&self) -> Result<&rocksdb::ColumnFamily, StorageError> {
        self.db
            .cf_handle(CF_ITEMS)
            .ok_or_else(|| StorageError::MissingColumnFamily(CF_ITEMS))
    }

    /// Store a new record, assigning it the next id.
    pub fn put_new_item(&self, record: NewItem) -> Result<Item, StorageError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let item = Item::from_new(id, record);
        self.put_item(&item)?;
        Ok(item)
    }

    /// Store many new records atomically.
    pub fn put_new_items(&self, records: Vec<NewItem>) -> Result<Vec<Item>, StorageError> {
        let cf = self.items_cf()?;
        let mut batch = WriteBatch::default();
        let mut items = Vec::with_capacity(records.len());

        for record in records {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let item = Item::from_new(id, record);
            let bytes = serde_json::to_vec(&item)?;
            batch.put_cf(cf, ItemKey::new(id).to_bytes(), bytes);
            items.push(item);
        }
        self.persist_next_id(&mut batch)?;

        self.db.write(batch)?;
        info!(count = items.len(), "Stored item batch");
        Ok(items)
    }

    /// Insert or overwrite an item under its own id.
    pub fn put_item(&self, item: &Item) -> Result<(), StorageError> {
        let cf = self.items_cf()?;
        let bytes = serde_json::to_vec(item)?;

        // Keep the counter ahead of explicitly-keyed writes
        self.next_id.fetch_max(item.id + 1, Ordering::SeqCst);

        let mut batch = WriteBatch::default();
        batch.put_cf(cf, ItemKey::new(item.id).to_bytes(), bytes);
        self.persist_next_id(&mut batch)?;
        self.db.write(batch)?;
        debug!(item_id = item.id, "Stored item");
        Ok(())
    }

    /// Get an item by id
    pub fn get_item(&self, id: ItemId) -> Result<Option<Item>, StorageError> {
        let cf = self.items_cf()?;
        match self.db.get_cf(cf, ItemKey::new(id).to_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Read every stored item in id order.
    pub fn list_items(&self) -> Result<Vec<Item>, StorageError> {
        let cf = self.items_cf()?;
        let prefix = ItemKey::prefix();
        let mut items = Vec::new();

        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));
        for entry in iter {
            let (key, value) = entry?;
            if !key.starts_with(prefix) {
                break;
            }
            items.push(serde_json::from_slice(&value)?);
        }

        Ok(items)
    }

    /// Replace the embedding of a stored item.
    pub fn update_embedding(&self, id: ItemId, embedding: Vec<f32>) -> Result<(), StorageError> {
        let mut item = self.get_item(id)?.ok_or(StorageError::NotFound(id))?;
        item.embedding = Some(embedding);
        self.put_item(&item)
    }

    /// Delete every item. Returns the number removed.
    ///
    /// The id counter is not reset, so ids are never reused.
    pub fn delete_all(&self) -> Result<usize, StorageError> {
        let cf = self.items_cf()?;
        let prefix = ItemKey::prefix();
        let mut batch = WriteBatch::default();
        let mut count = 0;

        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward));
        for entry in iter {
            let (key, _) = entry?;
            if !key.starts_with(prefix) {
                break;
            }
            batch.delete_cf(cf, key);
            count += 1;
        }

        self.db.write(batch)?;
        info!(count, "Deleted all items");
        Ok(count)
    }

    /// Count items and embedded items.
    pub fn get_stats(&self) -> Result<StorageStats, StorageError> {
        let items = self.list_items()?;
        Ok(StorageStats {
            item_count: items.len(),
            embedded_count: items.iter().filter(|i| i.has_embedding()).count(),
        })
    }

    /// Flush memtables to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}
