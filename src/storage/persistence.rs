//! File-backed store
//!
//! All tables live in one JSON document. Every batch is applied to a copy
//! of the tables, written to a temporary file and renamed over the live
//! file, so a batch is never half-persisted.
//!
//! A store holds an exclusive lock on `<ledger_file>.lock` for its whole
//! life. A second store on the same directory fails to open instead of
//! overwriting the first one's writes from a stale snapshot.

use crate::storage::table::{Store, StorageError, WriteBatch};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

type Tables = BTreeMap<String, BTreeMap<String, String>>;

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub ledger_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".coin_data"),
            ledger_file: "ledger.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// JSON file store
pub struct FileStore {
    config: StorageConfig,
    tables: Tables,
    // Released when the file is closed
    _lock: fs::File,
}

impl FileStore {
    /// Open (or create) the store described by `config`
    pub fn open(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;

        let lock_path = config
            .data_dir
            .join(format!("{}.lock", config.ledger_file));
        let lock = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        lock.try_lock_exclusive().map_err(|e| {
            if e.kind() == fs2::lock_contended_error().kind() {
                log::warn!("Ledger store {:?} is already open", config.data_dir);
                StorageError::Locked(config.data_dir.clone())
            } else {
                StorageError::IoError(e)
            }
        })?;

        let path = config.data_dir.join(&config.ledger_file);
        let tables = if path.exists() {
            let file = fs::File::open(&path)?;
            serde_json::from_reader(BufReader::new(file))?
        } else {
            Tables::new()
        };

        Ok(Self {
            config,
            tables,
            _lock: lock,
        })
    }

    /// Get the ledger file path
    fn ledger_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.ledger_file)
    }

    /// Get a backup file path
    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.ledger_file, index))
    }

    /// Whether the ledger file has been written
    pub fn exists(&self) -> bool {
        self.ledger_path().exists()
    }

    fn write_tables(&self, tables: &Tables) -> Result<(), StorageError> {
        let path = self.ledger_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        // Write to temporary file first
        let temp_path = self
            .config
            .data_dir
            .join(format!("{}.tmp", self.config.ledger_file));
        let file = fs::File::create(&temp_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), tables)?;

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|i| self.backup_path(*i).exists())
            .collect()
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats, StorageError> {
        let path = self.ledger_path();
        let file_size = if path.exists() {
            fs::metadata(&path)?.len()
        } else {
            0
        };

        Ok(StorageStats {
            file_size,
            record_count: self.tables.values().map(BTreeMap::len).sum(),
            backup_count: self.list_backups().len(),
            data_dir: self.config.data_dir.clone(),
        })
    }
}

impl Store for FileStore {
    fn get(&self, table: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self
            .tables
            .get(table)
            .and_then(|records| records.get(key))
            .map(|value| value.as_bytes().to_vec()))
    }

    fn apply(&mut self, batch: WriteBatch) -> Result<(), StorageError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut next = self.tables.clone();
        for write in batch {
            let value = String::from_utf8(write.value).map_err(|_| {
                StorageError::InvalidData(format!(
                    "Record {}/{} is not valid UTF-8",
                    write.table, write.key
                ))
            })?;
            next.entry(write.table).or_default().insert(write.key, value);
        }

        self.write_tables(&next)?;
        self.tables = next;
        Ok(())
    }
}

/// Storage statistics
#[derive(Debug)]
pub struct StorageStats {
    pub file_size: u64,
    pub record_count: usize,
    pub backup_count: usize,
    pub data_dir: PathBuf,
}
