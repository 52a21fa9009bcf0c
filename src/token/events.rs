//! Results of successful ledger operations
//!
//! Each mutating operation returns one of these; the entry layer turns it
//! into the success notification.

use serde::Serialize;
use std::fmt;

/// Tokens moved between two accounts
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferEvent {
    pub from: String,
    pub to: String,
    pub value: u64,
}

impl fmt::Display for TransferEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transferred {} from {} to {}", self.value, self.from, self.to)
    }
}

/// An allowance was set
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ApprovalEvent {
    pub owner: String,
    pub spender: String,
    pub value: u64,
}

impl fmt::Display for ApprovalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Approved {} for {} to spend {}",
            self.spender, self.owner, self.value
        )
    }
}

/// How an allowance adjustment landed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AllowanceOutcome {
    /// Applied as requested
    Updated,
    /// Capped at the owner's balance
    Clamped,
    /// Floored at zero
    ClampedToZero,
}

/// An allowance was increased or decreased
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AllowanceUpdate {
    pub owner: String,
    pub spender: String,
    pub amount: u64,
    pub outcome: AllowanceOutcome,
}

impl fmt::Display for AllowanceUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            AllowanceOutcome::Updated => write!(
                f,
                "Allowance of {} for {} is now {}",
                self.spender, self.owner, self.amount
            ),
            AllowanceOutcome::Clamped => write!(
                f,
                "Allowance of {} for {} clamped to balance {}",
                self.spender, self.owner, self.amount
            ),
            AllowanceOutcome::ClampedToZero => write!(
                f,
                "Allowance of {} for {} clamped to zero",
                self.spender, self.owner
            ),
        }
    }
}

/// New tokens were created
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MintEvent {
    pub to: String,
    pub value: u64,
    pub total_supply: u64,
}

impl fmt::Display for MintEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Minted {} to {}, total supply {}",
            self.value, self.to, self.total_supply
        )
    }
}

/// Tokens were destroyed
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BurnEvent {
    pub from: String,
    pub value: u64,
    pub total_supply: u64,
}

impl fmt::Display for BurnEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Burned {} from {}, total supply {}",
            self.value, self.from, self.total_supply
        )
    }
}

/// Supply reconciliation across all registered accounts
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SupplyAudit {
    pub total_supply: u64,
    pub sum_of_balances: u128,
    pub accounts: usize,
}

impl SupplyAudit {
    pub fn is_consistent(&self) -> bool {
        u128::from(self.total_supply) == self.sum_of_balances
    }
}
