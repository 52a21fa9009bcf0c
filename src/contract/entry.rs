//! Named entry points over the token ledger
//!
//! The contract is what a host calls. It resolves the caller, runs the
//! ledger operation and reports the outcome through the notifier. Failures
//! never escape to the host: a rejected call is reported with
//! `success: false` and leaves the ledger untouched.

use crate::contract::context::Identity;
use crate::contract::inputs::*;
use crate::crypto::KeyProvider;
use crate::notify::Notifier;
use crate::storage::Store;
use crate::token::{LedgerError, LedgerResult, TokenLedger};
use serde::Serialize;

/// What the host gets back from a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Reply {
    /// Transaction finished; the outcome was notified
    Done,
    /// Query result
    Value(String),
}

impl Reply {
    pub fn value(&self) -> Option<&str> {
        match self {
            Reply::Value(v) => Some(v),
            Reply::Done => None,
        }
    }
}

/// Token ledger bound to a notifier
pub struct Contract<S: Store, K: KeyProvider, N: Notifier> {
    ledger: TokenLedger<S, K>,
    notifier: N,
}

impl<S: Store, K: KeyProvider, N: Notifier> Contract<S, K, N> {
    pub fn new(ledger: TokenLedger<S, K>, notifier: N) -> Self {
        Self { ledger, notifier }
    }

    pub fn ledger(&self) -> &TokenLedger<S, K> {
        &self.ledger
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Decode a JSON call and invoke it
    pub fn invoke_json(&mut self, identity: &dyn Identity, payload: &str) -> Reply {
        match serde_json::from_str::<Call>(payload) {
            Ok(call) => self.invoke(identity, call),
            Err(e) => {
                self.notifier
                    .result(false, &format!("Invalid call: {}", e));
                Reply::Done
            }
        }
    }

    /// Invoke a decoded call
    pub fn invoke(&mut self, identity: &dyn Identity, call: Call) -> Reply {
        let method = call.method();
        self.notifier.log(&format!("invoke {}", method));

        let outcome = if call.is_query() {
            self.query(identity, call).map(Reply::Value)
        } else {
            self.transact(identity, call)
        };

        match outcome {
            Ok(reply) => reply,
            Err(e) => {
                if !e.is_rejection() {
                    self.notifier
                        .log(&format!("{} failed in storage layer: {}", method, e));
                }
                self.notifier.result(false, &e.to_string());
                Reply::Done
            }
        }
    }

    fn sender(identity: &dyn Identity) -> LedgerResult<String> {
        identity
            .current_sender()
            .filter(|s| !s.is_empty())
            .ok_or(LedgerError::MissingSender)
    }

    fn query(&self, identity: &dyn Identity, call: Call) -> LedgerResult<String> {
        let (value, message) = match call {
            Call::TotalSupply => {
                let supply = self.ledger.total_supply()?;
                (supply.to_string(), format!("Total Supply is {}", supply))
            }
            Call::Name => {
                let name = self.ledger.name()?;
                (name.clone(), format!("Name is {}", name))
            }
            Call::Symbol => {
                let symbol = self.ledger.symbol()?;
                (symbol.clone(), format!("Symbol is {}", symbol))
            }
            Call::Decimals => {
                let decimals = self.ledger.decimals()?;
                (decimals.to_string(), format!("Decimals is {}", decimals))
            }
            Call::BalanceOf(input) => {
                let owner = match input.owner {
                    Some(owner) => owner,
                    None => Self::sender(identity)?,
                };
                let balance = self.ledger.balance_of(&owner)?;
                (
                    balance.to_string(),
                    format!("Balance for {} is {}", owner, balance),
                )
            }
            Call::Allowance(input) => {
                let amount = self.ledger.allowance(&input.owner, &input.spender)?;
                (
                    amount.to_string(),
                    format!(
                        "Allowance of {} for {} is {}",
                        input.spender, input.owner, amount
                    ),
                )
            }
            other => unreachable!("{} is not a query", other.method()),
        };

        self.notifier.result(true, &message);
        Ok(value)
    }

    fn transact(&mut self, identity: &dyn Identity, call: Call) -> LedgerResult<Reply> {
        let message = match call {
            Call::CreateCurrency(input) => {
                let id = self.ledger.create_currency(
                    &input.name,
                    &input.symbol,
                    input.initial_supply,
                )?;
                format!("Currency {} ({}) created with id {}", input.name, input.symbol, id)
            }
            Call::OpenAccount(input) => {
                let caller = Self::sender(identity)?;
                let account = self.ledger.open_account(&caller, input.kind)?;
                format!(
                    "{} account opened for {} with balance {}",
                    input.kind, caller, account.balance
                )
            }
            Call::Transfer(input) => {
                let caller = Self::sender(identity)?;
                self.ledger
                    .transfer(&caller, &input.to, input.value)?
                    .to_string()
            }
            Call::Approve(input) => {
                let caller = Self::sender(identity)?;
                self.ledger
                    .approve(&caller, &input.spender, input.value)?
                    .to_string()
            }
            Call::TransferFrom(input) => {
                let caller = Self::sender(identity)?;
                self.ledger
                    .transfer_from(&caller, &input.from, &input.to, input.value)?
                    .to_string()
            }
            Call::IncreaseAllowance(input) => {
                let caller = Self::sender(identity)?;
                self.ledger
                    .increase_allowance(&caller, &input.spender, input.added_value)?
                    .to_string()
            }
            Call::DecreaseAllowance(input) => {
                let caller = Self::sender(identity)?;
                self.ledger
                    .decrease_allowance(&caller, &input.spender, input.subtracted_value)?
                    .to_string()
            }
            Call::Mint(input) => {
                let caller = Self::sender(identity)?;
                self.ledger.mint(&caller, &input.to, input.value)?.to_string()
            }
            Call::Burn(input) => self.ledger.burn(&input.from, input.value)?.to_string(),
            Call::BurnFrom(input) => {
                let caller = Self::sender(identity)?;
                self.ledger
                    .burn_from(&caller, &input.spender, input.value)?
                    .to_string()
            }
            other => unreachable!("{} is not a transaction", other.method()),
        };

        self.notifier.result(true, &message);
        Ok(Reply::Done)
    }
}
