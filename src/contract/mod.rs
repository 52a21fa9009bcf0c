//! Entry points exposed to hosts
//!
//! Transaction-style calls report their outcome through a
//! [`Notifier`](crate::notify::Notifier) and return [`Reply::Done`];
//! query-style calls return their value as a string.
//!
//! # Example
//!
//! ```rust
//! use private_coin::contract::{Call, Contract, CreateCurrencyInput, Reply, Sender};
//! use private_coin::crypto::LocalKeyProvider;
//! use private_coin::notify::RecordingNotifier;
//! use private_coin::storage::MemoryStore;
//! use private_coin::token::TokenLedger;
//!
//! let ledger = TokenLedger::new(MemoryStore::new(), LocalKeyProvider::new());
//! let mut contract = Contract::new(ledger, RecordingNotifier::new());
//!
//! let alice = Sender::new("alice");
//! contract.invoke(&alice, Call::CreateCurrency(CreateCurrencyInput {
//!     name: "Coin".to_string(),
//!     symbol: "COIN".to_string(),
//!     initial_supply: 1000,
//! }));
//! contract.invoke_json(&alice, r#"{"method":"openAccount","params":{}}"#);
//!
//! assert_eq!(contract.invoke(&alice, Call::TotalSupply), Reply::Value("1000".to_string()));
//! ```

pub mod context;
pub mod entry;
pub mod inputs;

pub use context::{Anonymous, Identity, Sender};
pub use entry::{Contract, Reply};
pub use inputs::{
    AllowanceInput, ApproveInput, BalanceOfInput, BurnFromInput, BurnInput, Call,
    CreateCurrencyInput, DecreaseAllowanceInput, IncreaseAllowanceInput, MintInput,
    OpenAccountInput, TransferFromInput, TransferInput,
};
