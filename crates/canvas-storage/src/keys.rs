//! Key encoding and decoding for storage layer.
//!
//! Key format: `item:{id:020}`. Zero padding makes lexicographic order
//! match numeric order, so a reverse iterator yields the highest id.

use std::str::FromStr;

use crate::error::StorageError;

const ITEM_PREFIX: &str = "item:";

/// Key for item storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ItemKey {
    pub id: i64,
}

impl ItemKey {
    pub fn new(id: i64) -> Self {
        Self { id }
    }

    /// Encode key to bytes for storage
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("{}{:020}", ITEM_PREFIX, self.id).into_bytes()
    }

    /// Decode key from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StorageError::Key(format!("Invalid UTF-8: {}", e)))?;
        s.parse()
    }

    /// Prefix shared by every item key
    pub fn prefix() -> &'static [u8] {
        ITEM_PREFIX.as_bytes()
    }
}

impl FromStr for ItemKey {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(ITEM_PREFIX)
            .ok_or_else(|| StorageError::Key(format!("Missing item prefix: {}", s)))?;
        let id = digits
            .parse::<i64>()
            .map_err(|e| StorageError::Key(format!("Invalid item id '{}': {}", digits, e)))?;
        Ok(Self { id })
    }
}
