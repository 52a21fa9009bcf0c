//! Ledger configuration
//!
//! Loaded from `config.json` in the data directory when present, otherwise
//! the defaults below apply.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Table holding the single currency record
pub const CURRENCY_TABLE: &str = "CurrencyTable";

/// Table holding account records keyed by address
pub const ACCOUNT_TABLE: &str = "AccountTable";

/// Key of the currency record
pub const CURRENCY_KEY: &str = "ALL";

/// Config file name inside the data directory
pub const CONFIG_FILE: &str = "config.json";

/// What `approve` does when the caller has no record for the spender
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovePolicy {
    /// Create the record (ERC-20 semantics)
    #[default]
    CreateOrUpdate,
    /// Only update existing records; a missing record is rejected
    UpdateExisting,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub currency_table: String,
    pub account_table: String,
    pub currency_key: String,
    /// Decimals given to a newly created currency
    pub default_decimals: u8,
    pub approve_policy: ApprovePolicy,
    /// When set, only this address may mint
    pub minter: Option<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            currency_table: CURRENCY_TABLE.to_string(),
            account_table: ACCOUNT_TABLE.to_string(),
            currency_key: CURRENCY_KEY.to_string(),
            default_decimals: 0,
            approve_policy: ApprovePolicy::default(),
            minter: None,
        }
    }
}

impl LedgerConfig {
    /// Load `config.json` from `data_dir`, falling back to defaults
    pub fn load(data_dir: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let data = fs::read_to_string(&path)?;
        let config = serde_json::from_str(&data)?;
        log::debug!("Loaded ledger config from {:?}", path);
        Ok(config)
    }
}
