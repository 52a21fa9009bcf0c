//! ERC-20 style single-currency token ledger
//!
//! Provides:
//! - The persisted entities (currency, accounts, allowance records)
//! - The account registry every operation resolves addresses through
//! - Transfer, approve, transferFrom, allowance adjustments, mint and burn
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
//!
//! // The first account opened holds the initial supply
//! ledger.open_account("alice", AccountKind::Personal).unwrap();
//! ledger.open_account("bob", AccountKind::Personal).unwrap();
//!
//! ledger.transfer("alice", "bob", 100).unwrap();
//! assert_eq!(ledger.balance_of("bob").unwrap(), 100);
//! ```

pub mod error;
pub mod events;
pub mod ledger;
pub mod model;
pub mod registry;

pub use error::{LedgerError, LedgerResult};
pub use events::{
    AllowanceOutcome, AllowanceUpdate, ApprovalEvent, BurnEvent, MintEvent, SupplyAudit,
    TransferEvent,
};
pub use ledger::TokenLedger;
pub use model::{Account, AccountKind, Allowance, Currency};
pub use registry::AccountRegistry;
