//! SIMP token console.
//!
//! Reads balances and submits transfers and burns for the account whose key
//! is in `SIMP_PRIVATE_KEY`, against the one configured network.
//!
//! ```text
//! simp-console [--config simp.toml] balance [--address 0x…]
//! simp-console transfer <TO> <AMOUNT>
//! simp-console burn <AMOUNT>
//! simp-console watch
//! ```

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use simp_console::blockchain::{BlockchainClient, RpcConnector};
use simp_console::config::validation::validate_config;
use simp_console::config::{load_config, read_config, AppConfig, ConfigError};
use simp_console::lifecycle::signals::shutdown_on_ctrl_c;
use simp_console::lifecycle::Shutdown;
use simp_console::notice::{LogNotifier, Notice, NoticeLevel, Notifier};
use simp_console::observability::{logging, metrics};
use simp_console::session::{LocalWalletProvider, WalletProvider};
use simp_console::token::request::parse_recipient;
use simp_console::token::{
    BurnRequest, TokenBalance, TokenConsole, TransactionOutcome, TransferRequest,
};

#[derive(Parser)]
#[command(name = "simp-console")]
#[command(about = "Balance, transfer and burn for the SIMP token", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `network.rpc_url`.
    #[arg(long)]
    rpc_url: Option<String>,

    /// Override `token.contract_address`.
    #[arg(long)]
    contract: Option<String>,

    /// Print notices and results as JSON lines.
    #[arg(long)]
    json: bool,

    /// Send notices to the log instead of stdout.
    #[arg(long)]
    log_notices: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a token balance (the wallet's own when no address is given)
    Balance {
        #[arg(short, long)]
        address: Option<String>,
    },
    /// Transfer tokens to another address
    Transfer { to: String, amount: String },
    /// Burn tokens from the wallet
    Burn { amount: String },
    /// Follow wallet network changes and keep the balance in sync
    Watch {
        /// Seconds between network probes.
        #[arg(long, default_value_t = 5)]
        network_poll_secs: u64,
    },
}

/// Renders notices on the terminal.
struct PrintNotifier {
    json: bool,
}

impl Notifier for PrintNotifier {
    fn notify(&self, notice: Notice) {
        if self.json {
            if let Ok(line) = serde_json::to_string(&notice) {
                println!("{}", line);
                return;
            }
        }
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => "error",
        };
        println!("[{}] {}", tag, notice.message);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;

    logging::init_logging(&config.observability.log_level);
    tracing::debug!(
        network = %config.network.name,
        chain_id = config.network.chain_id,
        contract = %config.token.contract_address,
        "Configuration loaded"
    );

    let client = BlockchainClient::new(config.network.clone())?;
    let wallet = Arc::new(LocalWalletProvider::from_env(&client).await?);
    let notifier: Arc<dyn Notifier> = if cli.log_notices {
        Arc::new(LogNotifier)
    } else {
        Arc::new(PrintNotifier { json: cli.json })
    };
    let console = TokenConsole::new(
        &config,
        wallet.clone(),
        Arc::new(client.clone()),
        Arc::new(RpcConnector::new(client.clone())),
        notifier,
    )?;
    let symbol = config.token.symbol.as_str();

    match cli.command {
        Commands::Balance { address: Some(address) } => {
            let owner = parse_recipient(&address)?;
            client.verify_chain_id().await?;
            match console.balances().read_balance(owner).await {
                Ok(balance) => print_balance(&balance, symbol, cli.json),
                Err(e) => {
                    eprintln!("{}", e);
                    process::exit(1);
                }
            }
        }
        Commands::Balance { address: None } => {
            let session = console.wallet().session();
            match console.watcher().sync(&session).await {
                Ok(balance) => print_balance(&balance, symbol, cli.json),
                Err(_) => process::exit(1),
            }
        }
        Commands::Transfer { to, amount } => {
            let outcome = console
                .orchestrator()
                .transfer(TransferRequest::new(to, amount))
                .await;
            report(outcome, symbol, cli.json);
        }
        Commands::Burn { amount } => {
            let outcome = console.orchestrator().burn(BurnRequest::new(amount)).await;
            report(outcome, symbol, cli.json);
        }
        Commands::Watch { network_poll_secs } => {
            if config.observability.metrics_enabled {
                match config.observability.metrics_address.parse() {
                    Ok(addr) => metrics::init_metrics(addr),
                    Err(_) => tracing::error!(
                        metrics_address = %config.observability.metrics_address,
                        "Failed to parse metrics address"
                    ),
                }
            }
            if !client.is_healthy().await {
                tracing::warn!(rpc_url = %config.network.rpc_url, "RPC endpoint unreachable");
            }

            let shutdown = Shutdown::new();
            let watcher = tokio::spawn(console.watcher().run(shutdown.subscribe()));
            let tracker = tokio::spawn(wallet.clone().track_network(
                client.clone(),
                Duration::from_secs(network_poll_secs.max(1)),
                shutdown.subscribe(),
            ));

            let mut balances = console.balances().subscribe();
            let mut stop = shutdown.subscribe();
            let json = cli.json;
            let symbol = symbol.to_string();
            let printer = tokio::spawn(async move {
                loop {
                    tokio::select! {
                        changed = balances.changed() => {
                            if changed.is_err() {
                                break;
                            }
                            let published = *balances.borrow_and_update();
                            print_balance(&published.balance, &symbol, json);
                        }
                        _ = stop.recv() => break,
                    }
                }
            });

            shutdown_on_ctrl_c(&shutdown).await;
            let _ = tokio::join!(watcher, tracker, printer);
        }
    }

    Ok(())
}

/// The config file as given, or with the command-line overrides applied
/// before validation.
fn resolve_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let overridden = cli.rpc_url.is_some() || cli.contract.is_some();
    if let (Some(path), false) = (&cli.config, overridden) {
        return load_config(path);
    }

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(url) = &cli.rpc_url {
        config.network.rpc_url = url.clone();
    }
    if let Some(contract) = &cli.contract {
        config.token.contract_address = contract.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn print_balance(balance: &TokenBalance, symbol: &str, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "owner": balance.owner.map(|a| a.to_string()),
                "balance": balance.display(),
                "symbol": symbol,
            })
        );
    } else {
        match balance.owner {
            Some(owner) => println!("Balance of {}: {} {}", owner, balance.display(), symbol),
            None => println!("Balance: {} {}", balance.display(), symbol),
        }
    }
}

/// The notifier has already shown the outcome; add the details and set the
/// exit status.
fn report(outcome: TransactionOutcome, symbol: &str, json: bool) {
    match outcome {
        TransactionOutcome::Success(success) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "tx_hash": success.tx_hash.to_string(),
                        "block_number": success.block_number,
                        "balance": success.balance.display(),
                        "symbol": symbol,
                    })
                );
            } else {
                println!("Transaction {} in block {}", success.tx_hash, success.block_number);
                print_balance(&success.balance, symbol, false);
            }
        }
        TransactionOutcome::Failure(_) => process::exit(1),
    }
}
