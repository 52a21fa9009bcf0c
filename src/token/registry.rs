//! Account registry: the admission gate for every balance-touching call
//!
//! An address resolves to an account only when the currency exists, the
//! address is listed in the currency's registry, and a stored account
//! record exists, checked in that order.

use crate::config::LedgerConfig;
use crate::storage::Store;
use crate::token::error::{LedgerError, LedgerResult};
use crate::token::model::{Account, Currency};

/// Read-only view over stored currency and account records
pub struct AccountRegistry<'a, S: Store + ?Sized> {
    store: &'a S,
    config: &'a LedgerConfig,
}

impl<'a, S: Store + ?Sized> AccountRegistry<'a, S> {
    pub fn new(store: &'a S, config: &'a LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Load the currency record if one was created
    pub fn load_currency(&self) -> LedgerResult<Option<Currency>> {
        let raw = self
            .store
            .get(&self.config.currency_table, &self.config.currency_key)?;
        match raw {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Load the currency record, failing if absent
    pub fn currency(&self) -> LedgerResult<Currency> {
        self.load_currency()?.ok_or(LedgerError::CurrencyNotFound)
    }

    /// Load a stored account record without consulting the registry
    pub fn load_account(&self, address: &str) -> LedgerResult<Option<Account>> {
        match self.store.get(&self.config.account_table, address)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Resolve `address` to its account
    pub fn resolve(&self, address: &str) -> LedgerResult<Account> {
        let currency = self.currency()?;
        self.resolve_in(&currency, address)
    }

    /// Resolve `address` against an already loaded currency
    pub fn resolve_in(&self, currency: &Currency, address: &str) -> LedgerResult<Account> {
        if !currency.is_registered(address) {
            return Err(LedgerError::AddressNotRegistered(address.to_string()));
        }

        self.load_account(address)?.ok_or_else(|| {
            log::warn!(
                "Registry lists {} but no account record is stored",
                address
            );
            LedgerError::AccountRecordMissing(address.to_string())
        })
    }

    /// Every registered address with its account, in registration order
    pub fn registered_accounts(&self) -> LedgerResult<Vec<(String, Account)>> {
        let currency = self.currency()?;
        currency
            .accounts()
            .iter()
            .map(|address| {
                self.resolve_in(&currency, address)
                    .map(|account| (address.clone(), account))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::token::model::AccountKind;

    fn seed(store: &mut MemoryStore, config: &LedgerConfig, registered: &[&str], stored: &[&str]) {
        let mut currency = Currency::new(
            "id".to_string(),
            "Coin".to_string(),
            "COIN".to_string(),
            0,
            100,
        );
        for address in registered {
            currency.register(address);
        }
        store
            .set(
                &config.currency_table,
                &config.currency_key,
                serde_json::to_vec(&currency).unwrap(),
            )
            .unwrap();

        for address in stored {
            let account = Account::with_balance(AccountKind::Personal, 10);
            store
                .set(
                    &config.account_table,
                    address,
                    serde_json::to_vec(&account).unwrap(),
                )
                .unwrap();
        }
    }

    #[test]
    fn test_resolve_without_currency() {
        let store = MemoryStore::new();
        let config = LedgerConfig::default();
        let registry = AccountRegistry::new(&store, &config);

        assert!(matches!(
            registry.resolve("alice"),
            Err(LedgerError::CurrencyNotFound)
        ));
        assert!(matches!(
            registry.registered_accounts(),
            Err(LedgerError::CurrencyNotFound)
        ));
    }

    #[test]
    fn test_resolve_precedence() {
        let mut store = MemoryStore::new();
        let config = LedgerConfig::default();
        // bob has a record but is not listed; carol is listed without a record
        seed(&mut store, &config, &["alice", "carol"], &["alice", "bob"]);
        let registry = AccountRegistry::new(&store, &config);

        assert_eq!(registry.resolve("alice").unwrap().balance, 10);
        assert!(matches!(
            registry.resolve("bob"),
            Err(LedgerError::AddressNotRegistered(a)) if a == "bob"
        ));
        assert!(matches!(
            registry.resolve("carol"),
            Err(LedgerError::AccountRecordMissing(a)) if a == "carol"
        ));
    }

    #[test]
    fn test_registered_accounts_in_order() {
        let mut store = MemoryStore::new();
        let config = LedgerConfig::default();
        seed(&mut store, &config, &["bob", "alice"], &["alice", "bob"]);
        let registry = AccountRegistry::new(&store, &config);

        let addresses: Vec<String> = registry
            .registered_accounts()
            .unwrap()
            .into_iter()
            .map(|(address, _)| address)
            .collect();
        assert_eq!(addresses, vec!["bob".to_string(), "alice".to_string()]);
    }
}
