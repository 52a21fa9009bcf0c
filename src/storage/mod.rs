//! Storage module for ledger records

pub mod persistence;
pub mod table;

pub use persistence::{FileStore, StorageConfig, StorageStats};
pub use table::{MemoryStore, StorageError, Store, Write, WriteBatch};
