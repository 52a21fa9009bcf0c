//! Table-keyed record storage
//!
//! Records are opaque bytes addressed by a table name and a record key.
//! Writes that belong to one ledger operation are grouped in a
//! [`WriteBatch`] and applied atomically: either every write lands or none.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Ledger in {} is already open by another store", .0.display())]
    Locked(PathBuf),
}

/// A single pending write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    pub table: String,
    pub key: String,
    pub value: Vec<u8>,
}

/// Ordered set of writes committed together
///
/// A later write to the same table/key replaces an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a write
    pub fn put(&mut self, table: &str, key: &str, value: Vec<u8>) {
        if let Some(existing) = self
            .writes
            .iter_mut()
            .find(|w| w.table == table && w.key == key)
        {
            existing.value = value;
            return;
        }

        self.writes.push(Write {
            table: table.to_string(),
            key: key.to_string(),
            value,
        });
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

impl IntoIterator for WriteBatch {
    type Item = Write;
    type IntoIter = std::vec::IntoIter<Write>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}

/// Get/set storage keyed by table and record key
///
/// Implementations must apply a batch atomically.
pub trait Store {
    /// Read a record, `None` when absent
    fn get(&self, table: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Apply every write in `batch`, all or nothing
    fn apply(&mut self, batch: WriteBatch) -> Result<(), StorageError>;

    /// Write a single record
    fn set(&mut self, table: &str, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        let mut batch = WriteBatch::new();
        batch.put(table, key, value);
        self.apply(batch)
    }

    /// Whether a record exists
    fn contains(&self, table: &str, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(table, key)?.is_some())
    }
}

impl<T: Store + ?Sized> Store for Box<T> {
    fn get(&self, table: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(table, key)
    }

    fn apply(&mut self, batch: WriteBatch) -> Result<(), StorageError> {
        (**self).apply(batch)
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: HashMap<String, BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a table
    pub fn table_len(&self, table: &str) -> usize {
        self.tables.get(table).map(BTreeMap::len).unwrap_or(0)
    }
}

impl Store for MemoryStore {
    fn get(&self, table: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self
            .tables
            .get(table)
            .and_then(|records| records.get(key))
            .cloned())
    }

    fn apply(&mut self, batch: WriteBatch) -> Result<(), StorageError> {
        for write in batch {
            self.tables
                .entry(write.table)
                .or_default()
                .insert(write.key, write.value);
        }
        Ok(())
    }
}
