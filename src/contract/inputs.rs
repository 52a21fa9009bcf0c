//! Typed inputs for the ledger's entry points
//!
//! A [`Call`] decodes from JSON of the form
//! `{"method": "transfer", "params": {"to": "bob", "value": 10}}`.

use crate::token::AccountKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCurrencyInput {
    pub name: String,
    pub symbol: String,
    pub initial_supply: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAccountInput {
    #[serde(default)]
    pub kind: AccountKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferInput {
    pub to: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveInput {
    pub spender: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFromInput {
    pub from: String,
    pub to: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceInput {
    pub owner: String,
    pub spender: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncreaseAllowanceInput {
    pub spender: String,
    pub added_value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecreaseAllowanceInput {
    pub spender: String,
    pub subtracted_value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintInput {
    pub to: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnInput {
    pub from: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnFromInput {
    pub spender: String,
    pub value: u64,
}

/// Balance query; the caller's own balance when `owner` is omitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceOfInput {
    #[serde(default)]
    pub owner: Option<String>,
}

/// A decoded external call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
pub enum Call {
    CreateCurrency(CreateCurrencyInput),
    OpenAccount(OpenAccountInput),
    Transfer(TransferInput),
    Approve(ApproveInput),
    TransferFrom(TransferFromInput),
    IncreaseAllowance(IncreaseAllowanceInput),
    DecreaseAllowance(DecreaseAllowanceInput),
    Mint(MintInput),
    Burn(BurnInput),
    BurnFrom(BurnFromInput),
    Allowance(AllowanceInput),
    BalanceOf(BalanceOfInput),
    TotalSupply,
    Name,
    Symbol,
    Decimals,
}

impl Call {
    /// Entry point name
    pub fn method(&self) -> &'static str {
        match self {
            Call::CreateCurrency(_) => "createCurrency",
            Call::OpenAccount(_) => "openAccount",
            Call::Transfer(_) => "transfer",
            Call::Approve(_) => "approve",
            Call::TransferFrom(_) => "transferFrom",
            Call::IncreaseAllowance(_) => "increaseAllowance",
            Call::DecreaseAllowance(_) => "decreaseAllowance",
            Call::Mint(_) => "mint",
            Call::Burn(_) => "burn",
            Call::BurnFrom(_) => "burnFrom",
            Call::Allowance(_) => "allowance",
            Call::BalanceOf(_) => "balanceOf",
            Call::TotalSupply => "totalSupply",
            Call::Name => "name",
            Call::Symbol => "symbol",
            Call::Decimals => "decimals",
        }
    }

    /// Queries return a value and never mutate state
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Call::Allowance(_)
                | Call::BalanceOf(_)
                | Call::TotalSupply
                | Call::Name
                | Call::Symbol
                | Call::Decimals
        )
    }
}
