//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 hashing
//! - secp256k1 key pairs and key identifiers
//! - The key provider used to mint currency identities

pub mod hash;
pub mod keys;
pub mod provider;

pub use hash::{double_sha256, sha256, sha256_hex};
pub use keys::{public_key_from_hex, public_key_to_id, KeyError, KeyPair};
pub use provider::{KeyHandle, KeyProvider, LocalKeyProvider};
