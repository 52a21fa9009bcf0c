//! Ledger error taxonomy

use crate::crypto::KeyError;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors produced by ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Currency not found")]
    CurrencyNotFound,
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Address not registered: {0}")]
    AddressNotRegistered(String),
    #[error("Account record missing for registered address: {0}")]
    AccountRecordMissing(String),
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u64, need: u64 },
    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: u64, need: u64 },
    #[error("No allowance for spender: {0}")]
    NoAllowance(String),
    #[error("Invalid spender: address must not be empty")]
    InvalidSpender,
    #[error("Recipient not registered: {0}")]
    RecipientNotRegistered(String),
    #[error("Insufficient total supply: have {have}, need {need}")]
    InsufficientTotalSupply { have: u64, need: u64 },
    #[error("Invalid name: must be 1-50 characters")]
    InvalidName,
    #[error("Invalid symbol: must be 1-10 characters")]
    InvalidSymbol,
    #[error("Supply overflow")]
    SupplyOverflow,
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("No sender in call context")]
    MissingSender,
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
}

impl LedgerError {
    /// True for validation rejections, false for infrastructure failures
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            LedgerError::Storage(_) | LedgerError::Codec(_) | LedgerError::Key(_)
        )
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
