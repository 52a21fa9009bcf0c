//! Token ledger: the ERC-20 style state machine
//!
//! Every mutating operation follows the same shape: resolve the currency and
//! accounts through the registry, validate in a fixed order (first failure
//! wins and nothing is written), mutate in-memory copies, then persist all
//! touched records in one atomic write batch.

use crate::config::{ApprovePolicy, LedgerConfig};
use crate::crypto::KeyProvider;
use crate::storage::{Store, WriteBatch};
use crate::token::error::{LedgerError, LedgerResult};
use crate::token::events::{
    AllowanceOutcome, AllowanceUpdate, ApprovalEvent, BurnEvent, MintEvent, SupplyAudit,
    TransferEvent,
};
use crate::token::model::{Account, AccountKind, Currency};
use crate::token::registry::AccountRegistry;

/// Maximum currency name length
pub const MAX_NAME_LEN: usize = 50;

/// Maximum currency symbol length
pub const MAX_SYMBOL_LEN: usize = 10;

fn check_spender(spender: &str) -> LedgerResult<()> {
    if spender.is_empty() {
        return Err(LedgerError::InvalidSpender);
    }
    Ok(())
}

/// Single-currency token ledger over a store and a key provider
pub struct TokenLedger<S: Store, K: KeyProvider> {
    store: S,
    keys: K,
    config: LedgerConfig,
}

impl<S: Store, K: KeyProvider> TokenLedger<S, K> {
    /// Create a ledger with default configuration
    pub fn new(store: S, keys: K) -> Self {
        Self::with_config(store, keys, LedgerConfig::default())
    }

    pub fn with_config(store: S, keys: K, config: LedgerConfig) -> Self {
        Self {
            store,
            keys,
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn keys(&self) -> &K {
        &self.keys
    }

    /// Registry view over the current store
    pub fn registry(&self) -> AccountRegistry<'_, S> {
        AccountRegistry::new(&self.store, &self.config)
    }

    /// Persist the touched records in one batch
    fn commit(
        &mut self,
        currency: Option<&Currency>,
        accounts: &[(&str, &Account)],
    ) -> LedgerResult<()> {
        let mut batch = WriteBatch::new();

        if let Some(currency) = currency {
            batch.put(
                &self.config.currency_table,
                &self.config.currency_key,
                serde_json::to_vec(currency)?,
            );
        }

        for (address, account) in accounts {
            batch.put(
                &self.config.account_table,
                address,
                serde_json::to_vec(account)?,
            );
        }

        self.store.apply(batch)?;
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create the ledger's currency; returns its identifier
    ///
    /// The identifier is the key id registered under `name` with the key
    /// provider, generated on first use.
    pub fn create_currency(
        &mut self,
        name: &str,
        symbol: &str,
        initial_supply: u64,
    ) -> LedgerResult<String> {
        if let Some(existing) = self.registry().load_currency()? {
            return Err(LedgerError::AlreadyExists(format!(
                "currency {} ({})",
                existing.name, existing.symbol
            )));
        }

        let name_len = name.chars().count();
        if name_len == 0 || name_len > MAX_NAME_LEN {
            return Err(LedgerError::InvalidName);
        }

        let symbol_len = symbol.chars().count();
        if symbol_len == 0 || symbol_len > MAX_SYMBOL_LEN {
            return Err(LedgerError::InvalidSymbol);
        }

        let key_id = match self.keys.lookup(name) {
            Some(key_id) => key_id,
            None => self.keys.generate(name)?.key_id,
        };

        let currency = Currency::new(
            key_id.clone(),
            name.to_string(),
            symbol.to_string(),
            self.config.default_decimals,
            initial_supply,
        );
        self.commit(Some(&currency), &[])?;

        log::info!(
            "Currency created: {} ({}) supply {} id {}",
            name,
            symbol,
            initial_supply,
            key_id
        );

        Ok(key_id)
    }

    /// Open an account for `caller`
    ///
    /// The first account opened holds the initial supply; later accounts
    /// start empty.
    pub fn open_account(&mut self, caller: &str, kind: AccountKind) -> LedgerResult<Account> {
        let registry = self.registry();
        let mut currency = registry.currency()?;

        if registry.load_account(caller)?.is_some() {
            return Err(LedgerError::AlreadyExists(format!("account {}", caller)));
        }

        let account = if currency.accounts().is_empty() {
            Account::with_balance(kind, currency.total_supply)
        } else {
            Account::new(kind)
        };

        currency.register(caller);
        self.commit(Some(&currency), &[(caller, &account)])?;

        log::info!(
            "Account opened: {} ({}) balance {}",
            caller,
            kind,
            account.balance
        );

        Ok(account)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn name(&self) -> LedgerResult<String> {
        Ok(self.registry().currency()?.name)
    }

    pub fn symbol(&self) -> LedgerResult<String> {
        Ok(self.registry().currency()?.symbol)
    }

    pub fn decimals(&self) -> LedgerResult<u8> {
        Ok(self.registry().currency()?.decimals)
    }

    pub fn total_supply(&self) -> LedgerResult<u64> {
        Ok(self.registry().currency()?.total_supply)
    }

    /// Balance of a registered address
    pub fn balance_of(&self, address: &str) -> LedgerResult<u64> {
        Ok(self.registry().resolve(address)?.balance)
    }

    /// Amount `spender` may still move out of `owner`
    ///
    /// Zero when the owner does not resolve or has no record for the spender.
    pub fn allowance(&self, owner: &str, spender: &str) -> LedgerResult<u64> {
        match self.registry().resolve(owner) {
            Ok(account) => Ok(account.allowance(spender).map(|a| a.amount).unwrap_or(0)),
            Err(LedgerError::CurrencyNotFound)
            | Err(LedgerError::AddressNotRegistered(_))
            | Err(LedgerError::AccountRecordMissing(_)) => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Registered accounts in registration order
    pub fn accounts(&self) -> LedgerResult<Vec<(String, Account)>> {
        self.registry().registered_accounts()
    }

    /// Reconcile total supply against the sum of balances
    pub fn audit(&self) -> LedgerResult<SupplyAudit> {
        let registry = self.registry();
        let currency = registry.currency()?;
        let accounts = registry.registered_accounts()?;

        Ok(SupplyAudit {
            total_supply: currency.total_supply,
            sum_of_balances: accounts.iter().map(|(_, a)| u128::from(a.balance)).sum(),
            accounts: accounts.len(),
        })
    }

    // =========================================================================
    // Transfers
    // =========================================================================

    /// Move `value` from `caller` to `to`
    pub fn transfer(&mut self, caller: &str, to: &str, value: u64) -> LedgerResult<TransferEvent> {
        let registry = self.registry();
        let currency = registry.currency()?;
        let mut from_account = registry.resolve_in(&currency, caller)?;
        let mut to_account = registry.resolve_in(&currency, to)?;

        if from_account.balance < value {
            return Err(LedgerError::InsufficientBalance {
                have: from_account.balance,
                need: value,
            });
        }

        let event = TransferEvent {
            from: caller.to_string(),
            to: to.to_string(),
            value,
        };

        // A self-transfer moves nothing
        if caller == to {
            return Ok(event);
        }

        from_account.balance -= value;
        to_account.balance = to_account
            .balance
            .checked_add(value)
            .ok_or(LedgerError::SupplyOverflow)?;

        self.commit(None, &[(caller, &from_account), (to, &to_account)])?;

        log::debug!("{}", event);
        Ok(event)
    }

    /// Set the allowance of `spender` over the caller's tokens
    pub fn approve(
        &mut self,
        caller: &str,
        spender: &str,
        value: u64,
    ) -> LedgerResult<ApprovalEvent> {
        check_spender(spender)?;
        let mut account = self.registry().resolve(caller)?;

        match self.config.approve_policy {
            ApprovePolicy::CreateOrUpdate => account.set_allowance(spender, value),
            ApprovePolicy::UpdateExisting => {
                let record = account
                    .allowance_mut(spender)
                    .ok_or_else(|| LedgerError::NoAllowance(spender.to_string()))?;
                record.amount = value;
            }
        }

        self.commit(None, &[(caller, &account)])?;

        let event = ApprovalEvent {
            owner: caller.to_string(),
            spender: spender.to_string(),
            value,
        };
        log::debug!("{}", event);
        Ok(event)
    }

    /// Move `value` from `from` to `to`, spending the caller's allowance
    pub fn transfer_from(
        &mut self,
        caller: &str,
        from: &str,
        to: &str,
        value: u64,
    ) -> LedgerResult<TransferEvent> {
        let registry = self.registry();
        let currency = registry.currency()?;
        let mut from_account = registry.resolve_in(&currency, from)?;
        let mut to_account = registry.resolve_in(&currency, to)?;

        if from_account.balance < value {
            return Err(LedgerError::InsufficientBalance {
                have: from_account.balance,
                need: value,
            });
        }

        let record = from_account
            .allowance_mut(caller)
            .ok_or_else(|| LedgerError::NoAllowance(caller.to_string()))?;
        if record.amount < value {
            return Err(LedgerError::InsufficientAllowance {
                have: record.amount,
                need: value,
            });
        }
        record.amount -= value;

        let event = TransferEvent {
            from: from.to_string(),
            to: to.to_string(),
            value,
        };

        if from == to {
            self.commit(None, &[(from, &from_account)])?;
            return Ok(event);
        }

        from_account.balance -= value;
        to_account.balance = to_account
            .balance
            .checked_add(value)
            .ok_or(LedgerError::SupplyOverflow)?;

        self.commit(None, &[(from, &from_account), (to, &to_account)])?;

        log::debug!("{} (spender {})", event, caller);
        Ok(event)
    }

    // =========================================================================
    // Allowance adjustments
    // =========================================================================

    /// Add to an existing allowance, never exceeding the caller's balance
    pub fn increase_allowance(
        &mut self,
        caller: &str,
        spender: &str,
        added_value: u64,
    ) -> LedgerResult<AllowanceUpdate> {
        check_spender(spender)?;
        let mut account = self.registry().resolve(caller)?;
        let balance = account.balance;

        let record = account
            .allowance_mut(spender)
            .ok_or_else(|| LedgerError::NoAllowance(spender.to_string()))?;

        let requested = record.amount.saturating_add(added_value);
        let (amount, outcome) = if requested > balance {
            (balance, AllowanceOutcome::Clamped)
        } else {
            (requested, AllowanceOutcome::Updated)
        };
        record.amount = amount;

        self.commit(None, &[(caller, &account)])?;

        Ok(AllowanceUpdate {
            owner: caller.to_string(),
            spender: spender.to_string(),
            amount,
            outcome,
        })
    }

    /// Subtract from an existing allowance, flooring at zero
    pub fn decrease_allowance(
        &mut self,
        caller: &str,
        spender: &str,
        subtracted_value: u64,
    ) -> LedgerResult<AllowanceUpdate> {
        check_spender(spender)?;
        let mut account = self.registry().resolve(caller)?;

        let record = account
            .allowance_mut(spender)
            .ok_or_else(|| LedgerError::NoAllowance(spender.to_string()))?;

        let (amount, outcome) = match record.amount.checked_sub(subtracted_value) {
            Some(amount) => (amount, AllowanceOutcome::Updated),
            None => (0, AllowanceOutcome::ClampedToZero),
        };
        record.amount = amount;

        self.commit(None, &[(caller, &account)])?;

        Ok(AllowanceUpdate {
            owner: caller.to_string(),
            spender: spender.to_string(),
            amount,
            outcome,
        })
    }

    // =========================================================================
    // Supply changes
    // =========================================================================

    /// Create `value` new tokens in `to`'s account
    pub fn mint(&mut self, caller: &str, to: &str, value: u64) -> LedgerResult<MintEvent> {
        let registry = self.registry();
        let mut currency = registry.currency()?;

        if let Some(minter) = &self.config.minter {
            if minter != caller {
                return Err(LedgerError::Unauthorized(format!(
                    "{} may not mint",
                    caller
                )));
            }
        }

        let total_supply = currency
            .total_supply
            .checked_add(value)
            .ok_or(LedgerError::SupplyOverflow)?;

        let mut account = registry.resolve_in(&currency, to).map_err(|e| match e {
            LedgerError::AddressNotRegistered(a) | LedgerError::AccountRecordMissing(a) => {
                LedgerError::RecipientNotRegistered(a)
            }
            other => other,
        })?;

        account.balance = account
            .balance
            .checked_add(value)
            .ok_or(LedgerError::SupplyOverflow)?;
        currency.total_supply = total_supply;

        self.commit(Some(&currency), &[(to, &account)])?;

        let event = MintEvent {
            to: to.to_string(),
            value,
            total_supply,
        };
        log::info!("{}", event);
        Ok(event)
    }

    /// Destroy `value` tokens held by `from`
    pub fn burn(&mut self, from: &str, value: u64) -> LedgerResult<BurnEvent> {
        let registry = self.registry();
        let mut currency = registry.currency()?;
        let mut account = registry.resolve_in(&currency, from)?;

        if account.balance < value {
            return Err(LedgerError::InsufficientBalance {
                have: account.balance,
                need: value,
            });
        }

        currency.total_supply = currency.total_supply.saturating_sub(value);
        account.balance = account.balance.saturating_sub(value);

        self.commit(Some(&currency), &[(from, &account)])?;

        let event = BurnEvent {
            from: from.to_string(),
            value,
            total_supply: currency.total_supply,
        };
        log::info!("{}", event);
        Ok(event)
    }

    /// Burn the caller's tokens against the allowance granted to `spender`
    pub fn burn_from(
        &mut self,
        caller: &str,
        spender: &str,
        value: u64,
    ) -> LedgerResult<BurnEvent> {
        check_spender(spender)?;
        let registry = self.registry();
        let mut currency = registry.currency()?;
        let mut account = registry.resolve_in(&currency, caller)?;
        let balance = account.balance;

        let record = account
            .allowance_mut(spender)
            .ok_or_else(|| LedgerError::NoAllowance(spender.to_string()))?;
        if record.amount < value {
            return Err(LedgerError::InsufficientAllowance {
                have: record.amount,
                need: value,
            });
        }
        if balance < value {
            return Err(LedgerError::InsufficientBalance {
                have: balance,
                need: value,
            });
        }
        if currency.total_supply < value {
            return Err(LedgerError::InsufficientTotalSupply {
                have: currency.total_supply,
                need: value,
            });
        }

        record.amount -= value;
        account.balance -= value;
        currency.total_supply -= value;

        self.commit(Some(&currency), &[(caller, &account)])?;

        let event = BurnEvent {
            from: caller.to_string(),
            value,
            total_supply: currency.total_supply,
        };
        log::info!("{} (allowance of {})", event, spender);
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::LocalKeyProvider;
    use crate::storage::MemoryStore;

    type TestLedger = TokenLedger<MemoryStore, LocalKeyProvider>;

    fn create_test_ledger() -> TestLedger {
        let mut ledger = TokenLedger::new(MemoryStore::new(), LocalKeyProvider::new());
        ledger.create_currency("Coin", "COIN", 1000).unwrap();
        ledger.open_account("alice", AccountKind::Personal).unwrap();
        ledger.open_account("bob", AccountKind::Personal).unwrap();
        ledger
    }

    /// Overwrite a stored record directly, bypassing the ledger
    fn put_currency(ledger: &mut TestLedger, currency: &Currency) {
        let config = ledger.config.clone();
        ledger
            .store
            .set(
                &config.currency_table,
                &config.currency_key,
                serde_json::to_vec(currency).unwrap(),
            )
            .unwrap();
    }

    fn assert_consistent(ledger: &TestLedger) {
        assert!(ledger.audit().unwrap().is_consistent());
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    #[test]
    fn test_create_currency() {
        let mut ledger = TokenLedger::new(MemoryStore::new(), LocalKeyProvider::new());
        let id = ledger.create_currency("Coin", "COIN", 1000).unwrap();

        assert_eq!(ledger.keys().lookup("Coin"), Some(id.clone()));
        let currency = ledger.registry().currency().unwrap();
        assert_eq!(currency.id, id);
        assert_eq!(currency.name, "Coin");
        assert_eq!(currency.symbol, "COIN");
        assert_eq!(currency.decimals, 0);
        assert_eq!(currency.total_supply, 1000);
        assert!(currency.accounts().is_empty());
    }

    #[test]
    fn test_create_currency_twice_keeps_first() {
        let mut ledger = TokenLedger::new(MemoryStore::new(), LocalKeyProvider::new());
        ledger.create_currency("Coin", "COIN", 1000).unwrap();
        let before = ledger.registry().currency().unwrap();

        let result = ledger.create_currency("Other", "OTH", 5);
        assert!(matches!(result, Err(LedgerError::AlreadyExists(_))));
        assert_eq!(ledger.registry().currency().unwrap(), before);
        assert!(ledger.keys().lookup("Other").is_none());
    }

    #[test]
    fn test_create_currency_reuses_existing_key() {
        let mut keys = LocalKeyProvider::new();
        let handle = keys.generate("Coin").unwrap();

        let mut ledger = TokenLedger::new(MemoryStore::new(), keys);
        let id = ledger.create_currency("Coin", "COIN", 10).unwrap();
        assert_eq!(id, handle.key_id);
        assert_eq!(ledger.keys().len(), 1);
    }

    #[test]
    fn test_create_currency_validation() {
        let mut ledger = TokenLedger::new(MemoryStore::new(), LocalKeyProvider::new());
        assert!(matches!(
            ledger.create_currency("", "COIN", 1),
            Err(LedgerError::InvalidName)
        ));
        assert!(matches!(
            ledger.create_currency(&"x".repeat(51), "COIN", 1),
            Err(LedgerError::InvalidName)
        ));
        assert!(matches!(
            ledger.create_currency("Coin", "TOOLONGSYMBOL", 1),
            Err(LedgerError::InvalidSymbol)
        ));
        assert!(ledger.registry().load_currency().unwrap().is_none());
    }

    #[test]
    fn test_configured_decimals() {
        let config = LedgerConfig {
            default_decimals: 6,
            ..Default::default()
        };
        let mut ledger =
            TokenLedger::with_config(MemoryStore::new(), LocalKeyProvider::new(), config);
        ledger.create_currency("Coin", "COIN", 1).unwrap();
        assert_eq!(ledger.decimals().unwrap(), 6);
    }

    #[test]
    fn test_open_account_seeds_first_account() {
        let ledger = create_test_ledger();

        assert_eq!(ledger.balance_of("alice").unwrap(), 1000);
        assert_eq!(ledger.balance_of("bob").unwrap(), 0);
        let currency = ledger.registry().currency().unwrap();
        assert_eq!(
            currency.accounts(),
            &["alice".to_string(), "bob".to_string()]
        );
        assert_consistent(&ledger);
    }

    #[test]
    fn test_open_account_twice_rejected() {
        let mut ledger = create_test_ledger();
        let result = ledger.open_account("bob", AccountKind::Business);
        assert!(matches!(result, Err(LedgerError::AlreadyExists(_))));

        let (_, bob) = ledger.registry().registered_accounts().unwrap()[1].clone();
        assert_eq!(bob.kind, AccountKind::Personal);
        assert_eq!(ledger.registry().currency().unwrap().accounts().len(), 2);
    }

    #[test]
    fn test_open_account_without_currency() {
        let mut ledger = TokenLedger::new(MemoryStore::new(), LocalKeyProvider::new());
        assert!(matches!(
            ledger.open_account("alice", AccountKind::Personal),
            Err(LedgerError::CurrencyNotFound)
        ));
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    #[test]
    fn test_metadata_queries() {
        let ledger = create_test_ledger();
        assert_eq!(ledger.name().unwrap(), "Coin");
        assert_eq!(ledger.symbol().unwrap(), "COIN");
        assert_eq!(ledger.total_supply().unwrap(), 1000);
    }

    #[test]
    fn test_balance_of_unregistered() {
        let ledger = create_test_ledger();
        assert!(matches!(
            ledger.balance_of("carol"),
            Err(LedgerError::AddressNotRegistered(_))
        ));
    }

    #[test]
    fn test_allowance_defaults_to_zero() {
        let empty = TokenLedger::new(MemoryStore::new(), LocalKeyProvider::new());
        assert_eq!(empty.allowance("alice", "bob").unwrap(), 0);

        let ledger = create_test_ledger();
        assert_eq!(ledger.allowance("carol", "bob").unwrap(), 0);
        assert_eq!(ledger.allowance("alice", "bob").unwrap(), 0);
    }

    // -------------------------------------------------------------------------
    // Transfer
    // -------------------------------------------------------------------------

    #[test]
    fn test_transfer() {
        let mut ledger = create_test_ledger();

        let event = ledger.transfer("alice", "bob", 100).unwrap();

        assert_eq!(event.from, "alice");
        assert_eq!(event.to, "bob");
        assert_eq!(event.value, 100);
        assert_eq!(ledger.balance_of("alice").unwrap(), 900);
        assert_eq!(ledger.balance_of("bob").unwrap(), 100);
        assert_eq!(ledger.total_supply().unwrap(), 1000);
        assert_consistent(&ledger);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut ledger = create_test_ledger();

        let result = ledger.transfer("bob", "alice", 1);
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientBalance { have: 0, need: 1 }
        ));
        assert!(err.to_string().contains("Insufficient balance"));
        assert_eq!(ledger.balance_of("alice").unwrap(), 1000);
        assert_eq!(ledger.balance_of("bob").unwrap(), 0);
    }

    #[test]
    fn test_transfer_unregistered_parties() {
        let mut ledger = create_test_ledger();

        assert!(matches!(
            ledger.transfer("carol", "bob", 1),
            Err(LedgerError::AddressNotRegistered(a)) if a == "carol"
        ));
        assert!(matches!(
            ledger.transfer("alice", "carol", 1),
            Err(LedgerError::AddressNotRegistered(a)) if a == "carol"
        ));
        assert_eq!(ledger.balance_of("alice").unwrap(), 1000);
    }

    #[test]
    fn test_transfer_checks_recipient_before_balance() {
        let mut ledger = create_test_ledger();
        // bob cannot cover 5, but the unknown recipient is reported first
        assert!(matches!(
            ledger.transfer("bob", "carol", 5),
            Err(LedgerError::AddressNotRegistered(_))
        ));
    }

    #[test]
    fn test_self_transfer_keeps_balance() {
        let mut ledger = create_test_ledger();
        ledger.transfer("alice", "alice", 400).unwrap();
        assert_eq!(ledger.balance_of("alice").unwrap(), 1000);

        assert!(matches!(
            ledger.transfer("alice", "alice", 2000),
            Err(LedgerError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_transfer_with_missing_record() {
        let mut ledger = create_test_ledger();
        let mut currency = ledger.registry().currency().unwrap();
        currency.register("ghost");
        put_currency(&mut ledger, &currency);

        assert!(matches!(
            ledger.transfer("alice", "ghost", 1),
            Err(LedgerError::AccountRecordMissing(a)) if a == "ghost"
        ));
        assert_eq!(ledger.balance_of("alice").unwrap(), 1000);
    }

    // -------------------------------------------------------------------------
    // Approve / transferFrom
    // -------------------------------------------------------------------------

    #[test]
    fn test_approve_creates_and_overwrites() {
        let mut ledger = create_test_ledger();

        ledger.approve("alice", "bob", 50).unwrap();
        assert_eq!(ledger.allowance("alice", "bob").unwrap(), 50);

        // Absolute set, not additive
        ledger.approve("alice", "bob", 20).unwrap();
        assert_eq!(ledger.allowance("alice", "bob").unwrap(), 20);

        ledger.approve("alice", "bob", 0).unwrap();
        assert_eq!(ledger.allowance("alice", "bob").unwrap(), 0);
    }

    #[test]
    fn test_empty_spender_rejected() {
        let mut ledger = create_test_ledger();
        ledger.approve("alice", "bob", 50).unwrap();
        let before = ledger.registry().resolve("alice").unwrap();

        assert!(matches!(
            ledger.approve("alice", "", 50),
            Err(LedgerError::InvalidSpender)
        ));
        assert!(matches!(
            ledger.increase_allowance("alice", "", 10),
            Err(LedgerError::InvalidSpender)
        ));
        assert!(matches!(
            ledger.decrease_allowance("alice", "", 10),
            Err(LedgerError::InvalidSpender)
        ));
        assert!(matches!(
            ledger.burn_from("alice", "", 10),
            Err(LedgerError::InvalidSpender)
        ));

        let after = ledger.registry().resolve("alice").unwrap();
        assert_eq!(after, before);
        assert!(after.allowance("").is_none());
        assert_eq!(ledger.total_supply().unwrap(), 1000);
    }

    #[test]
    fn test_approve_update_existing_policy() {
        let config = LedgerConfig {
            approve_policy: ApprovePolicy::UpdateExisting,
            ..Default::default()
        };
        let mut ledger =
            TokenLedger::with_config(MemoryStore::new(), LocalKeyProvider::new(), config);
        ledger.create_currency("Coin", "COIN", 1000).unwrap();
        ledger.open_account("alice", AccountKind::Personal).unwrap();
        ledger.open_account("bob", AccountKind::Personal).unwrap();

        let result = ledger.approve("alice", "bob", 50);
        assert!(matches!(result, Err(LedgerError::NoAllowance(s)) if s == "bob"));

        let alice = ledger.registry().resolve("alice").unwrap();
        assert!(alice.allowances().is_empty());
        assert_eq!(ledger.allowance("alice", "bob").unwrap(), 0);
    }

    #[test]
    fn test_approve_unregistered_owner() {
        let mut ledger = create_test_ledger();
        assert!(matches!(
            ledger.approve("carol", "bob", 1),
            Err(LedgerError::AddressNotRegistered(_))
        ));
    }

    #[test]
    fn test_transfer_from() {
        let mut ledger = create_test_ledger();
        ledger.open_account("carol", AccountKind::Personal).unwrap();
        ledger.approve("alice", "bob", 500).unwrap();

        let event = ledger.transfer_from("bob", "alice", "carol", 200).unwrap();

        assert_eq!(event.from, "alice");
        assert_eq!(event.to, "carol");
        assert_eq!(ledger.balance_of("alice").unwrap(), 800);
        assert_eq!(ledger.balance_of("carol").unwrap(), 200);
        assert_eq!(ledger.balance_of("bob").unwrap(), 0);
        assert_eq!(ledger.allowance("alice", "bob").unwrap(), 300);
        assert_consistent(&ledger);
    }

    #[test]
    fn test_transfer_from_insufficient_allowance() {
        let mut ledger = create_test_ledger();
        ledger.approve("alice", "bob", 50).unwrap();

        let result = ledger.transfer_from("bob", "alice", "bob", 60);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientAllowance { have: 50, need: 60 })
        ));
        assert_eq!(ledger.balance_of("alice").unwrap(), 1000);
        assert_eq!(ledger.balance_of("bob").unwrap(), 0);
        assert_eq!(ledger.allowance("alice", "bob").unwrap(), 50);
    }

    #[test]
    fn test_transfer_from_without_allowance() {
        let mut ledger = create_test_ledger();
        assert!(matches!(
            ledger.transfer_from("bob", "alice", "bob", 1),
            Err(LedgerError::NoAllowance(s)) if s == "bob"
        ));
    }

    #[test]
    fn test_transfer_from_balance_checked_before_allowance() {
        let mut ledger = create_test_ledger();
        ledger.approve("alice", "bob", 5000).unwrap();

        assert!(matches!(
            ledger.transfer_from("bob", "alice", "bob", 2000),
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(ledger.allowance("alice", "bob").unwrap(), 5000);
    }

    #[test]
    fn test_transfer_from_spender_need_not_be_registered() {
        let mut ledger = create_test_ledger();
        ledger.approve("alice", "relayer", 100).unwrap();

        ledger.transfer_from("relayer", "alice", "bob", 100).unwrap();
        assert_eq!(ledger.balance_of("bob").unwrap(), 100);
        assert_eq!(ledger.allowance("alice", "relayer").unwrap(), 0);

        // The exhausted record is zeroed, not removed
        let alice = ledger.registry().resolve("alice").unwrap();
        assert_eq!(alice.allowances().len(), 1);
    }

    #[test]
    fn test_transfer_from_to_owner_spends_allowance_only() {
        let mut ledger = create_test_ledger();
        ledger.approve("alice", "bob", 100).unwrap();

        ledger.transfer_from("bob", "alice", "alice", 40).unwrap();
        assert_eq!(ledger.balance_of("alice").unwrap(), 1000);
        assert_eq!(ledger.allowance("alice", "bob").unwrap(), 60);
    }

    // -------------------------------------------------------------------------
    // increase / decrease allowance
    // -------------------------------------------------------------------------

    #[test]
    fn test_increase_allowance() {
        let mut ledger = create_test_ledger();
        ledger.approve("alice", "bob", 100).unwrap();

        let update = ledger.increase_allowance("alice", "bob", 50).unwrap();
        assert_eq!(update.amount, 150);
        assert_eq!(update.outcome, AllowanceOutcome::Updated);
        assert_eq!(ledger.allowance("alice", "bob").unwrap(), 150);
    }

    #[test]
    fn test_increase_allowance_clamped_to_balance() {
        let mut ledger = create_test_ledger();
        ledger.approve("alice", "bob", 900).unwrap();

        let update = ledger.increase_allowance("alice", "bob", 500).unwrap();
        assert_eq!(update.outcome, AllowanceOutcome::Clamped);
        assert_eq!(update.amount, 1000);
        assert!(
            ledger.allowance("alice", "bob").unwrap() <= ledger.balance_of("alice").unwrap()
        );

        let update = ledger.increase_allowance("alice", "bob", u64::MAX).unwrap();
        assert_eq!(update.outcome, AllowanceOutcome::Clamped);
        assert_eq!(update.amount, 1000);
    }

    #[test]
    fn test_increase_allowance_bound_holds_after_spending() {
        let mut ledger = create_test_ledger();
        ledger.approve("alice", "bob", 10).unwrap();
        ledger.transfer("alice", "bob", 995).unwrap();

        ledger.increase_allowance("alice", "bob", 0).unwrap();
        assert_eq!(ledger.allowance("alice", "bob").unwrap(), 5);
        assert!(
            ledger.allowance("alice", "bob").unwrap() <= ledger.balance_of("alice").unwrap()
        );
    }

    #[test]
    fn test_increase_allowance_without_record() {
        let mut ledger = create_test_ledger();
        assert!(matches!(
            ledger.increase_allowance("alice", "bob", 10),
            Err(LedgerError::NoAllowance(_))
        ));
        assert_eq!(ledger.allowance("alice", "bob").unwrap(), 0);
    }

    #[test]
    fn test_decrease_allowance() {
        let mut ledger = create_test_ledger();
        ledger.approve("alice", "bob", 100).unwrap();

        let update = ledger.decrease_allowance("alice", "bob", 30).unwrap();
        assert_eq!(update.amount, 70);
        assert_eq!(update.outcome, AllowanceOutcome::Updated);

        let update = ledger.decrease_allowance("alice", "bob", 500).unwrap();
        assert_eq!(update.amount, 0);
        assert_eq!(update.outcome, AllowanceOutcome::ClampedToZero);
        assert_eq!(ledger.allowance("alice", "bob").unwrap(), 0);
    }

    #[test]
    fn test_decrease_allowance_without_record() {
        let mut ledger = create_test_ledger();
        assert!(matches!(
            ledger.decrease_allowance("alice", "bob", 1),
            Err(LedgerError::NoAllowance(_))
        ));
    }

    // -------------------------------------------------------------------------
    // Mint / burn
    // -------------------------------------------------------------------------

    #[test]
    fn test_mint() {
        let mut ledger = create_test_ledger();

        let event = ledger.mint("anyone", "bob", 250).unwrap();
        assert_eq!(event.total_supply, 1250);
        assert_eq!(ledger.total_supply().unwrap(), 1250);
        assert_eq!(ledger.balance_of("bob").unwrap(), 250);
        assert_consistent(&ledger);
    }

    #[test]
    fn test_mint_to_unregistered() {
        let mut ledger = create_test_ledger();
        assert!(matches!(
            ledger.mint("alice", "carol", 5),
            Err(LedgerError::RecipientNotRegistered(a)) if a == "carol"
        ));
        assert_eq!(ledger.total_supply().unwrap(), 1000);
    }

    #[test]
    fn test_mint_without_currency() {
        let mut ledger = TokenLedger::new(MemoryStore::new(), LocalKeyProvider::new());
        assert!(matches!(
            ledger.mint("alice", "alice", 5),
            Err(LedgerError::CurrencyNotFound)
        ));
    }

    #[test]
    fn test_mint_overflow() {
        let mut ledger = create_test_ledger();
        assert!(matches!(
            ledger.mint("alice", "bob", u64::MAX),
            Err(LedgerError::SupplyOverflow)
        ));
        assert_eq!(ledger.balance_of("bob").unwrap(), 0);
        assert_eq!(ledger.total_supply().unwrap(), 1000);
    }

    #[test]
    fn test_mint_restricted_to_minter() {
        let config = LedgerConfig {
            minter: Some("alice".to_string()),
            ..Default::default()
        };
        let mut ledger =
            TokenLedger::with_config(MemoryStore::new(), LocalKeyProvider::new(), config);
        ledger.create_currency("Coin", "COIN", 0).unwrap();
        ledger.open_account("alice", AccountKind::Personal).unwrap();
        ledger.open_account("bob", AccountKind::Personal).unwrap();

        assert!(matches!(
            ledger.mint("bob", "bob", 10),
            Err(LedgerError::Unauthorized(_))
        ));
        ledger.mint("alice", "bob", 10).unwrap();
        assert_eq!(ledger.balance_of("bob").unwrap(), 10);
    }

    #[test]
    fn test_burn() {
        let mut ledger = create_test_ledger();

        let event = ledger.burn("alice", 300).unwrap();
        assert_eq!(event.total_supply, 700);
        assert_eq!(ledger.balance_of("alice").unwrap(), 700);
        assert_consistent(&ledger);
    }

    #[test]
    fn test_burn_insufficient_balance() {
        let mut ledger = create_test_ledger();
        assert!(matches!(
            ledger.burn("bob", 1),
            Err(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(ledger.total_supply().unwrap(), 1000);
    }

    #[test]
    fn test_burn_saturates_supply() {
        let mut ledger = create_test_ledger();
        // Supply understated relative to balances
        let mut currency = ledger.registry().currency().unwrap();
        currency.total_supply = 100;
        put_currency(&mut ledger, &currency);

        let event = ledger.burn("alice", 300).unwrap();
        assert_eq!(event.total_supply, 0);
        assert_eq!(ledger.balance_of("alice").unwrap(), 700);
    }

    // -------------------------------------------------------------------------
    // burnFrom
    // -------------------------------------------------------------------------

    #[test]
    fn test_burn_from() {
        let mut ledger = create_test_ledger();
        ledger.approve("alice", "bob", 200).unwrap();

        let event = ledger.burn_from("alice", "bob", 150).unwrap();
        assert_eq!(event.total_supply, 850);
        assert_eq!(ledger.balance_of("alice").unwrap(), 850);
        assert_eq!(ledger.allowance("alice", "bob").unwrap(), 50);
        assert_consistent(&ledger);
    }

    #[test]
    fn test_burn_from_validation_order() {
        let mut ledger = create_test_ledger();

        assert!(matches!(
            ledger.burn_from("alice", "bob", 10),
            Err(LedgerError::NoAllowance(_))
        ));

        ledger.approve("alice", "bob", 5).unwrap();
        assert!(matches!(
            ledger.burn_from("alice", "bob", 10),
            Err(LedgerError::InsufficientAllowance { have: 5, need: 10 })
        ));

        ledger.approve("alice", "bob", 5000).unwrap();
        assert!(matches!(
            ledger.burn_from("alice", "bob", 2000),
            Err(LedgerError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_burn_from_insufficient_total_supply_aborts() {
        let mut ledger = create_test_ledger();
        ledger.approve("alice", "bob", 500).unwrap();

        let mut currency = ledger.registry().currency().unwrap();
        currency.total_supply = 100;
        put_currency(&mut ledger, &currency);

        let result = ledger.burn_from("alice", "bob", 300);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientTotalSupply { have: 100, need: 300 })
        ));
        assert_eq!(ledger.total_supply().unwrap(), 100);
        assert_eq!(ledger.balance_of("alice").unwrap(), 1000);
        assert_eq!(ledger.allowance("alice", "bob").unwrap(), 500);
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    #[test]
    fn test_state_survives_file_store_reopen() {
        use crate::storage::{FileStore, StorageConfig};

        let temp_dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
            ..Default::default()
        };

        let (currency, alice) = {
            let store = FileStore::open(config.clone()).unwrap();
            let mut ledger = TokenLedger::new(store, LocalKeyProvider::new());
            ledger.create_currency("Coin", "COIN", 1000).unwrap();
            ledger.open_account("alice", AccountKind::Business).unwrap();
            ledger.open_account("bob", AccountKind::Personal).unwrap();
            ledger.approve("alice", "bob", 30).unwrap();
            ledger.transfer("alice", "bob", 100).unwrap();
            (
                ledger.registry().currency().unwrap(),
                ledger.registry().resolve("alice").unwrap(),
            )
        };

        let store = FileStore::open(config).unwrap();
        let ledger = TokenLedger::new(store, LocalKeyProvider::new());
        assert_eq!(ledger.registry().currency().unwrap(), currency);
        assert_eq!(ledger.registry().resolve("alice").unwrap(), alice);
        assert_eq!(ledger.balance_of("bob").unwrap(), 100);
        assert_eq!(ledger.allowance("alice", "bob").unwrap(), 30);
    }
}
