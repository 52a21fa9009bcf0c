//! CLI commands for the ledger
//!
//! Every command opens the ledger in the data directory, invokes one
//! contract call and prints the reported outcome.

use crate::config::LedgerConfig;
use crate::contract::*;
use crate::crypto::LocalKeyProvider;
use crate::notify::RecordingNotifier;
use crate::storage::{FileStore, StorageConfig};
use crate::token::{AccountKind, TokenLedger};
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

pub type CliContract = Contract<FileStore, LocalKeyProvider, RecordingNotifier>;

/// Application state
pub struct AppState {
    pub contract: CliContract,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Open the ledger stored in `data_dir`
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage_config = StorageConfig {
            data_dir: data_dir.clone(),
            ..Default::default()
        };

        let store = FileStore::open(storage_config)?;
        let keys = LocalKeyProvider::with_dir(&data_dir.join("keys"))?;
        let config = LedgerConfig::load(&data_dir)?;

        if store.exists() {
            log::debug!("Opened existing ledger in {:?}", data_dir);
        }

        let ledger = TokenLedger::with_config(store, keys, config);

        Ok(Self {
            contract: Contract::new(ledger, RecordingNotifier::new()),
            data_dir,
        })
    }

    /// Invoke a call as `sender` and print its outcome
    ///
    /// Returns the query value, if any, and whether the call succeeded.
    pub fn run(&mut self, sender: Option<&str>, call: Call) -> (Option<String>, bool) {
        let reply = match sender {
            Some(address) => self.contract.invoke(&Sender::new(address), call),
            None => self.contract.invoke(&Anonymous, call),
        };

        let success = match self.contract.notifier().last() {
            Some(n) if n.success => {
                println!("✅ {}", n.message);
                true
            }
            Some(n) => {
                println!("❌ {}", n.message);
                false
            }
            None => false,
        };
        self.contract.notifier().clear();

        (reply.value().map(str::to_string), success)
    }
}

/// Create the currency in a fresh data directory
pub fn cmd_init(data_dir: &Path, name: &str, symbol: &str, initial_supply: u64) -> CliResult<()> {
    let mut state = AppState::new(data_dir.to_path_buf())?;

    let (_, success) = state.run(
        None,
        Call::CreateCurrency(CreateCurrencyInput {
            name: name.to_string(),
            symbol: symbol.to_string(),
            initial_supply,
        }),
    );

    if success {
        println!("   📁 Data directory: {:?}", data_dir);
        println!("   🪙 The first account opened receives {} {}", initial_supply, symbol);
    }

    Ok(())
}

/// Open an account for `sender`
pub fn cmd_open_account(state: &mut AppState, sender: &str, kind: AccountKind) -> CliResult<()> {
    state.run(Some(sender), Call::OpenAccount(OpenAccountInput { kind }));
    Ok(())
}

pub fn cmd_transfer(state: &mut AppState, sender: &str, to: &str, value: u64) -> CliResult<()> {
    state.run(
        Some(sender),
        Call::Transfer(TransferInput {
            to: to.to_string(),
            value,
        }),
    );
    Ok(())
}

pub fn cmd_approve(state: &mut AppState, sender: &str, spender: &str, value: u64) -> CliResult<()> {
    state.run(
        Some(sender),
        Call::Approve(ApproveInput {
            spender: spender.to_string(),
            value,
        }),
    );
    Ok(())
}

pub fn cmd_transfer_from(
    state: &mut AppState,
    sender: &str,
    from: &str,
    to: &str,
    value: u64,
) -> CliResult<()> {
    state.run(
        Some(sender),
        Call::TransferFrom(TransferFromInput {
            from: from.to_string(),
            to: to.to_string(),
            value,
        }),
    );
    Ok(())
}

pub fn cmd_allowance(state: &mut AppState, owner: &str, spender: &str) -> CliResult<()> {
    state.run(
        None,
        Call::Allowance(AllowanceInput {
            owner: owner.to_string(),
            spender: spender.to_string(),
        }),
    );
    Ok(())
}

pub fn cmd_increase_allowance(
    state: &mut AppState,
    sender: &str,
    spender: &str,
    added_value: u64,
) -> CliResult<()> {
    state.run(
        Some(sender),
        Call::IncreaseAllowance(IncreaseAllowanceInput {
            spender: spender.to_string(),
            added_value,
        }),
    );
    Ok(())
}

pub fn cmd_decrease_allowance(
    state: &mut AppState,
    sender: &str,
    spender: &str,
    subtracted_value: u64,
) -> CliResult<()> {
    state.run(
        Some(sender),
        Call::DecreaseAllowance(DecreaseAllowanceInput {
            spender: spender.to_string(),
            subtracted_value,
        }),
    );
    Ok(())
}

pub fn cmd_mint(state: &mut AppState, sender: &str, to: &str, value: u64) -> CliResult<()> {
    state.run(
        Some(sender),
        Call::Mint(MintInput {
            to: to.to_string(),
            value,
        }),
    );
    Ok(())
}

pub fn cmd_burn(state: &mut AppState, from: &str, value: u64) -> CliResult<()> {
    state.run(
        None,
        Call::Burn(BurnInput {
            from: from.to_string(),
            value,
        }),
    );
    Ok(())
}

pub fn cmd_burn_from(
    state: &mut AppState,
    sender: &str,
    spender: &str,
    value: u64,
) -> CliResult<()> {
    state.run(
        Some(sender),
        Call::BurnFrom(BurnFromInput {
            spender: spender.to_string(),
            value,
        }),
    );
    Ok(())
}

pub fn cmd_balance(state: &mut AppState, owner: &str) -> CliResult<()> {
    state.run(
        None,
        Call::BalanceOf(BalanceOfInput {
            owner: Some(owner.to_string()),
        }),
    );
    Ok(())
}

pub fn cmd_supply(state: &mut AppState) -> CliResult<()> {
    state.run(None, Call::TotalSupply);
    Ok(())
}

/// Display currency and storage info
pub fn cmd_info(state: &AppState) -> CliResult<()> {
    let ledger = state.contract.ledger();

    let currency = match ledger.registry().load_currency()? {
        Some(currency) => currency,
        None => {
            println!("📭 No currency yet. Create one with: private-coin init");
            return Ok(());
        }
    };
    let audit = ledger.audit()?;
    let stats = ledger.store().stats()?;

    println!("🪙 Currency Info");
    println!("   ├─ Id: {}", currency.id);
    println!("   ├─ Name: {}", currency.name);
    println!("   ├─ Symbol: {}", currency.symbol);
    println!("   ├─ Decimals: {}", currency.decimals);
    println!("   ├─ Total supply: {}", currency.total_supply);
    println!("   ├─ Accounts: {}", currency.accounts().len());
    if audit.is_consistent() {
        println!("   └─ Sum of balances: {} ✓", audit.sum_of_balances);
    } else {
        println!(
            "   └─ Sum of balances: {} ⚠️  differs from total supply",
            audit.sum_of_balances
        );
    }

    println!("\n💾 Storage");
    println!("   ├─ Directory: {:?}", stats.data_dir);
    println!("   ├─ Ledger file size: {} bytes", stats.file_size);
    println!("   ├─ Records: {}", stats.record_count);
    println!("   └─ Backups: {}", stats.backup_count);

    Ok(())
}

/// List registered accounts
pub fn cmd_accounts(state: &AppState) -> CliResult<()> {
    let accounts = state.contract.ledger().accounts()?;

    if accounts.is_empty() {
        println!("📭 No accounts found. Open one with: private-coin open-account --sender <address>");
        return Ok(());
    }

    println!("📋 Accounts:");
    for (address, account) in &accounts {
        println!("   {} ({}) - {}", address, account.kind, account.balance);
        for allowance in account.allowances() {
            println!("   └─ {} may spend {}", allowance.spender, allowance.amount);
        }
    }

    Ok(())
}
