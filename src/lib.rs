//! Private-coin: a single-currency ERC-20 style token ledger in Rust
//!
//! This crate provides:
//! - One currency with a fixed name, symbol and decimals
//! - Registered accounts holding balances and per-spender allowances
//! - Transfer, approve, transferFrom, allowance adjustments, mint and burn
//! - Table-keyed storage with atomic multi-record writes (memory or JSON file)
//! - secp256k1 key ids for the currency identifier
//! - Outcome notification, a CLI and a REST/WebSocket API
//!
//! # Example
//!
//! ```rust
//! use private_coin::crypto::LocalKeyProvider;
//! use private_coin::storage::MemoryStore;
//! use private_coin::token::{AccountKind, TokenLedger};
//!
//! let mut ledger = TokenLedger::new(MemoryStore::new(), LocalKeyProvider::new());
//! ledger.create_currency("Coin", "COIN", 1000).unwrap();
//! ledger.open_account("alice", AccountKind::Personal).unwrap();
//! ledger.open_account("bob", AccountKind::Personal).unwrap();
//!
//! ledger.approve("alice", "bob", 50).unwrap();
//! ledger.transfer_from("bob", "alice", "bob", 30).unwrap();
//!
//! assert_eq!(ledger.balance_of("bob").unwrap(), 30);
//! assert_eq!(ledger.allowance("alice", "bob").unwrap(), 20);
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod contract;
pub mod crypto;
pub mod notify;
pub mod storage;
pub mod token;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use config::{ApprovePolicy, LedgerConfig};
pub use contract::{Call, Contract, Reply};
pub use crypto::{KeyPair, KeyProvider, LocalKeyProvider};
pub use notify::{LogNotifier, Notifier, RecordingNotifier};
pub use storage::{FileStore, MemoryStore, Store};
pub use token::{Account, AccountKind, Currency, LedgerError, TokenLedger};
