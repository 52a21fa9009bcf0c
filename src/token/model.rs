//! Ledger entities: currency, accounts and allowance records
//!
//! These are the persisted records. Field names follow the stored record
//! shapes: `totalSupply`, `AccountType`, `allowed`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The token definition plus the registry of opened accounts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    /// Key identifier issued by the key provider
    pub id: String,
    pub name: String,
    pub symbol: String,
    /// Display precision only, never used in arithmetic
    pub decimals: u8,
    pub total_supply: u64,
    /// Registered addresses in registration order
    accounts: Vec<String>,
}

impl Currency {
    pub fn new(id: String, name: String, symbol: String, decimals: u8, total_supply: u64) -> Self {
        Self {
            id,
            name,
            symbol,
            decimals,
            total_supply,
            accounts: Vec::new(),
        }
    }

    /// Whether `address` has opened an account
    pub fn is_registered(&self, address: &str) -> bool {
        self.accounts.iter().any(|a| a == address)
    }

    /// Append `address` to the registry; returns false if already present
    pub fn register(&mut self, address: &str) -> bool {
        if self.is_registered(address) {
            return false;
        }
        self.accounts.push(address.to_string());
        true
    }

    /// Registered addresses in registration order
    pub fn accounts(&self) -> &[String] {
        &self.accounts
    }
}

/// Account classification
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    #[default]
    Personal,
    Business,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Personal => write!(f, "Personal"),
            AccountKind::Business => write!(f, "Business"),
        }
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "personal" => Ok(AccountKind::Personal),
            "business" => Ok(AccountKind::Business),
            other => Err(format!("Unknown account kind: {}", other)),
        }
    }
}

/// Amount a spender may move out of the owning account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allowance {
    pub spender: String,
    #[serde(rename = "value")]
    pub amount: u64,
}

impl Allowance {
    pub fn new(spender: &str, amount: u64) -> Self {
        Self {
            spender: spender.to_string(),
            amount,
        }
    }
}

/// One address's balance and the allowances it granted
///
/// The owning address is the storage key and is not repeated here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(rename = "AccountType", alias = "accountType")]
    pub kind: AccountKind,
    pub balance: u64,
    #[serde(rename = "allowed")]
    allowances: Vec<Allowance>,
}

impl Account {
    pub fn new(kind: AccountKind) -> Self {
        Self {
            kind,
            balance: 0,
            allowances: Vec::new(),
        }
    }

    pub fn with_balance(kind: AccountKind, balance: u64) -> Self {
        Self {
            kind,
            balance,
            allowances: Vec::new(),
        }
    }

    /// Allowance record for `spender`
    pub fn allowance(&self, spender: &str) -> Option<&Allowance> {
        self.allowances.iter().find(|a| a.spender == spender)
    }

    pub fn allowance_mut(&mut self, spender: &str) -> Option<&mut Allowance> {
        self.allowances.iter_mut().find(|a| a.spender == spender)
    }

    /// Set the allowance for `spender`, creating the record if needed
    pub fn set_allowance(&mut self, spender: &str, amount: u64) {
        match self.allowance_mut(spender) {
            Some(record) => record.amount = amount,
            None => self.allowances.push(Allowance::new(spender, amount)),
        }
    }

    pub fn allowances(&self) -> &[Allowance] {
        &self.allowances
    }
}
