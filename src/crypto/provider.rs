//! Key provider for currency identities
//!
//! The ledger never touches key material directly. It asks a [`KeyProvider`]
//! for a named key and records only the returned identifier.

use crate::crypto::keys::{KeyError, KeyPair};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Public half of a generated key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyHandle {
    /// Opaque identifier recorded by the ledger
    pub key_id: String,
    /// Compressed public key, hex encoded
    pub public_key: String,
}

/// Issues and looks up named keys
pub trait KeyProvider {
    /// Generate a new key under `name`
    fn generate(&mut self, name: &str) -> Result<KeyHandle, KeyError>;

    /// Look up the key id previously generated under `name`
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Serializable key data for persistence
#[derive(Debug, Serialize, Deserialize)]
struct KeyRecord {
    name: String,
    private_key_hex: String,
    key_id: String,
    created_at: DateTime<Utc>,
}

/// secp256k1 key provider, optionally backed by a key directory
///
/// Without a directory keys live only in memory. With one, every key is
/// written to `<dir>/<name>.json` and reloaded on construction.
pub struct LocalKeyProvider {
    keys: HashMap<String, KeyPair>,
    keys_dir: Option<PathBuf>,
}

impl LocalKeyProvider {
    /// Create an in-memory provider
    pub fn new() -> Self {
        Self {
            keys: HashMap::new(),
            keys_dir: None,
        }
    }

    /// Create a provider persisting keys under `keys_dir`
    pub fn with_dir(keys_dir: &Path) -> Result<Self, KeyError> {
        fs::create_dir_all(keys_dir)?;

        let mut keys = HashMap::new();
        for entry in fs::read_dir(keys_dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let json = fs::read_to_string(&path)?;
                let record: KeyRecord = serde_json::from_str(&json)?;
                let pair = KeyPair::from_private_key_hex(&record.private_key_hex)?;
                keys.insert(record.name, pair);
            }
        }

        log::debug!("Loaded {} key(s) from {:?}", keys.len(), keys_dir);

        Ok(Self {
            keys,
            keys_dir: Some(keys_dir.to_path_buf()),
        })
    }

    /// Number of keys held
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Public handle for a named key
    pub fn handle(&self, name: &str) -> Option<KeyHandle> {
        self.keys.get(name).map(|pair| KeyHandle {
            key_id: pair.key_id(),
            public_key: pair.public_key_hex(),
        })
    }

    fn key_path(dir: &Path, name: &str) -> PathBuf {
        // Names are free text; file names use their digest
        let digest = crate::crypto::sha256_hex(name.as_bytes());
        dir.join(format!("{}.json", &digest[..32]))
    }

    fn save(&self, name: &str, pair: &KeyPair) -> Result<(), KeyError> {
        if let Some(dir) = &self.keys_dir {
            let record = KeyRecord {
                name: name.to_string(),
                private_key_hex: pair.private_key_hex(),
                key_id: pair.key_id(),
                created_at: Utc::now(),
            };
            let json = serde_json::to_string_pretty(&record)?;
            fs::write(Self::key_path(dir, name), json)?;
        }
        Ok(())
    }
}

impl Default for LocalKeyProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyProvider for LocalKeyProvider {
    fn generate(&mut self, name: &str) -> Result<KeyHandle, KeyError> {
        if self.keys.contains_key(name) {
            return Err(KeyError::KeyExists(name.to_string()));
        }

        let pair = KeyPair::generate();
        self.save(name, &pair)?;

        let handle = KeyHandle {
            key_id: pair.key_id(),
            public_key: pair.public_key_hex(),
        };
        self.keys.insert(name.to_string(), pair);

        log::info!("Generated key '{}' ({})", name, handle.key_id);
        Ok(handle)
    }

    fn lookup(&self, name: &str) -> Option<String> {
        self.keys.get(name).map(KeyPair::key_id)
    }
}
