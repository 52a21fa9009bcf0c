//! Private-coin CLI Application
//!
//! A command-line interface for the single-currency token ledger.

use clap::{Parser, Subcommand};
use private_coin::api::{create_router, ApiState};
use private_coin::cli::{self, AppState};
use private_coin::config::LedgerConfig;
use private_coin::crypto::LocalKeyProvider;
use private_coin::storage::{FileStore, StorageConfig};
use private_coin::token::AccountKind;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "private-coin")]
#[command(version = "0.1.0")]
#[command(about = "A single-currency ERC-20 style token ledger", long_about = None)]
struct Cli {
    /// Data directory for ledger storage
    #[arg(short, long, default_value = ".coin_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the currency
    Init {
        /// Currency name (1-50 characters)
        #[arg(short, long)]
        name: String,

        /// Currency symbol (1-10 characters)
        #[arg(short, long)]
        symbol: String,

        /// Initial supply, credited to the first account opened
        #[arg(long, default_value = "0")]
        supply: u64,
    },

    /// Open an account for the sender
    OpenAccount {
        #[arg(long)]
        sender: String,

        /// Personal or Business
        #[arg(short, long, default_value = "personal")]
        kind: AccountKind,
    },

    /// Move tokens from the sender to another account
    Transfer {
        #[arg(long)]
        sender: String,

        #[arg(short, long)]
        to: String,

        #[arg(short, long)]
        value: u64,
    },

    /// Set how much a spender may move out of the sender's account
    Approve {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        spender: String,

        #[arg(short, long)]
        value: u64,
    },

    /// Spend an allowance granted by `from`
    TransferFrom {
        #[arg(long)]
        sender: String,

        #[arg(short, long)]
        from: String,

        #[arg(short, long)]
        to: String,

        #[arg(short, long)]
        value: u64,
    },

    /// Show the remaining allowance of a spender
    Allowance {
        #[arg(short, long)]
        owner: String,

        #[arg(long)]
        spender: String,
    },

    /// Raise an allowance, capped at the sender's balance
    IncreaseAllowance {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        spender: String,

        #[arg(short, long)]
        value: u64,
    },

    /// Lower an allowance, floored at zero
    DecreaseAllowance {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        spender: String,

        #[arg(short, long)]
        value: u64,
    },

    /// Create new tokens in an account
    Mint {
        #[arg(long)]
        sender: String,

        #[arg(short, long)]
        to: String,

        #[arg(short, long)]
        value: u64,
    },

    /// Destroy tokens held by an account
    Burn {
        #[arg(short, long)]
        from: String,

        #[arg(short, long)]
        value: u64,
    },

    /// Destroy tokens out of the sender's account, spending an allowance
    BurnFrom {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        spender: String,

        #[arg(short, long)]
        value: u64,
    },

    /// Show the balance of an account
    Balance {
        #[arg(short, long)]
        owner: String,
    },

    /// Show the total supply
    Supply,

    /// Display currency and storage information
    Info,

    /// List registered accounts
    Accounts,

    /// REST API server
    Api {
        #[command(subcommand)]
        action: ApiCommands,
    },
}

#[derive(Subcommand)]
enum ApiCommands {
    /// Start the REST API server
    Start {
        /// Port to listen on for REST API
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Handle init command separately (opens its own state)
    if let Commands::Init {
        name,
        symbol,
        supply,
    } = &cli.command
    {
        return cli::cmd_init(&cli.data_dir, name, symbol, *supply);
    }

    // Handle API commands with tokio runtime
    if let Commands::Api { ref action } = cli.command {
        return run_api_command(action, &cli.data_dir);
    }

    // Initialize application state
    let mut state = AppState::new(cli.data_dir.clone())?;

    // Process commands
    match cli.command {
        Commands::Init { .. } => unreachable!(),
        Commands::Api { .. } => unreachable!(),

        Commands::OpenAccount { sender, kind } => {
            cli::cmd_open_account(&mut state, &sender, kind)?;
        }

        Commands::Transfer { sender, to, value } => {
            cli::cmd_transfer(&mut state, &sender, &to, value)?;
        }

        Commands::Approve {
            sender,
            spender,
            value,
        } => {
            cli::cmd_approve(&mut state, &sender, &spender, value)?;
        }

        Commands::TransferFrom {
            sender,
            from,
            to,
            value,
        } => {
            cli::cmd_transfer_from(&mut state, &sender, &from, &to, value)?;
        }

        Commands::Allowance { owner, spender } => {
            cli::cmd_allowance(&mut state, &owner, &spender)?;
        }

        Commands::IncreaseAllowance {
            sender,
            spender,
            value,
        } => {
            cli::cmd_increase_allowance(&mut state, &sender, &spender, value)?;
        }

        Commands::DecreaseAllowance {
            sender,
            spender,
            value,
        } => {
            cli::cmd_decrease_allowance(&mut state, &sender, &spender, value)?;
        }

        Commands::Mint { sender, to, value } => {
            cli::cmd_mint(&mut state, &sender, &to, value)?;
        }

        Commands::Burn { from, value } => {
            cli::cmd_burn(&mut state, &from, value)?;
        }

        Commands::BurnFrom {
            sender,
            spender,
            value,
        } => {
            cli::cmd_burn_from(&mut state, &sender, &spender, value)?;
        }

        Commands::Balance { owner } => {
            cli::cmd_balance(&mut state, &owner)?;
        }

        Commands::Supply => {
            cli::cmd_supply(&mut state)?;
        }

        Commands::Info => {
            cli::cmd_info(&state)?;
        }

        Commands::Accounts => {
            cli::cmd_accounts(&state)?;
        }
    }

    Ok(())
}

fn run_api_command(action: &ApiCommands, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        match action {
            ApiCommands::Start { port } => {
                let storage_config = StorageConfig {
                    data_dir: data_dir.to_path_buf(),
                    ..Default::default()
                };
                let store = FileStore::open(storage_config)?;
                let keys = LocalKeyProvider::with_dir(&data_dir.join("keys"))?;
                let config = LedgerConfig::load(data_dir)?;

                let state = ApiState::new(Box::new(store), keys, config);
                let app = create_router(state);

                let addr = format!("0.0.0.0:{}", port);
                println!("🚀 REST API server starting on http://localhost:{}", port);
                println!("   📁 Data directory: {:?}", data_dir);

                println!();
                println!("📖 Available endpoints (caller in the x-sender header):");
                println!("   GET  /health                        - Health check");
                println!("   GET  /ws                            - Call results stream");
                println!("   GET  /api/currency                  - Currency info");
                println!("   POST /api/currency                  - Create currency");
                println!("   GET  /api/accounts                  - List accounts");
                println!("   POST /api/accounts                  - Open account");
                println!("   GET  /api/accounts/{{addr}}/balance   - Balance");
                println!("   GET  /api/allowance                 - Allowance");
                println!("   POST /api/transfer                  - Transfer");
                println!("   POST /api/approve                   - Approve spender");
                println!("   POST /api/transferFrom              - Spend allowance");
                println!("   POST /api/increaseAllowance         - Raise allowance");
                println!("   POST /api/decreaseAllowance         - Lower allowance");
                println!("   POST /api/mint                      - Mint");
                println!("   POST /api/burn                      - Burn");
                println!("   POST /api/burnFrom                  - Burn via allowance");
                println!("   POST /api/call                      - Any method");
                println!("   GET  /api/audit                     - Supply audit");
                println!();

                let listener = tokio::net::TcpListener::bind(&addr).await?;
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        tokio::signal::ctrl_c().await.ok();
                        println!("\n📴 Shutting down API server...");
                    })
                    .await?;
            }
        }

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
