//! chain-gateway CLI.
//!
//! ```text
//!   config (TOML + GATEWAY_* env)
//!       → Gateway::from_config (one connection per network)
//!       → subcommand (status, balance, estimate, send, ...)
//!       → pretty JSON on stdout
//! ```
//!
//! Signing keys are read only from `GATEWAY_SIGNING_KEY`.

use alloy::network::TransactionBuilder;
use alloy::primitives::Bytes;
use alloy::rpc::types::TransactionRequest;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chain_gateway::config::{load_config, load_from_env};
use chain_gateway::gateway::queries::parse_address;
use chain_gateway::network::parse_amount;
use chain_gateway::observability::{logging, metrics};
use chain_gateway::Gateway;

/// Environment variable holding the signing key for `send`.
const SIGNING_KEY_ENV_VAR: &str = "GATEWAY_SIGNING_KEY";

#[derive(Parser)]
#[command(name = "chain-gateway")]
#[command(about = "Query and transact on multiple EVM networks", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults plus GATEWAY_* variables when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Network key (ethereum, sepolia, polygon, amoy, bsc, localhost)
    #[arg(short, long)]
    network: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered networks
    Networks,
    /// Check network reachability
    Status {
        /// Check every network concurrently
        #[arg(long)]
        all: bool,
    },
    /// Compare each node's chain id with its profile
    Verify,
    /// Latest block number
    Block,
    /// Native balance of an address
    Balance { address: String },
    /// Transaction record by hash
    Tx { hash: String },
    /// Block height and current fees
    Info,
    /// Estimate gas for a transaction
    Estimate {
        #[arg(long)]
        to: String,
        /// Amount in base units (e.g. 0.01)
        #[arg(long, default_value = "0")]
        value: String,
        /// Hex-encoded call data
        #[arg(long)]
        data: Option<String>,
    },
    /// Sign and submit a transaction
    Send {
        #[arg(long)]
        to: String,
        /// Amount in base units (e.g. 0.01)
        #[arg(long, default_value = "0")]
        value: String,
        /// Hex-encoded call data
        #[arg(long)]
        data: Option<String>,
        /// Wait for this many confirmations
        #[arg(long)]
        wait: Option<u64>,
        /// Confirmation wait limit in seconds
        #[arg(long, default_value_t = 300)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };

    logging::init_logging(&config.observability.log_level);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let gateway = Gateway::from_config(&config)?;
    let network = cli.network.as_deref();

    match cli.command {
        Commands::Networks => print_json(&gateway.profiles())?,
        Commands::Status { all } => {
            if all {
                print_json(&gateway.get_all_network_status().await)?;
            } else {
                print_json(&gateway.get_network_status(network).await?)?;
            }
        }
        Commands::Verify => print_json(&gateway.verify_chain_ids().await)?,
        Commands::Block => {
            let block = gateway.get_block_number(network).await?;
            print_json(&json!({ "block_number": block }))?;
        }
        Commands::Balance { address } => {
            print_json(&gateway.get_wallet_balance(&address, network).await?)?;
        }
        Commands::Tx { hash } => {
            print_json(&gateway.get_transaction_details(&hash, network).await?)?;
        }
        Commands::Info => print_json(&gateway.get_network_info(network).await?)?,
        Commands::Estimate { to, value, data } => {
            let request = build_request(&gateway, network, &to, &value, data.as_deref())?;
            print_json(&gateway.estimate_gas_cost(&request, network).await?)?;
        }
        Commands::Send {
            to,
            value,
            data,
            wait,
            timeout,
        } => {
            let request = build_request(&gateway, network, &to, &value, data.as_deref())?;
            let signing_key = std::env::var(SIGNING_KEY_ENV_VAR)
                .map_err(|_| format!("Environment variable {} not set", SIGNING_KEY_ENV_VAR))?;

            let pending = gateway
                .send_transaction(request, &signing_key, network)
                .await?;
            drop(signing_key);

            print_json(&json!({
                "tx_hash": pending.hash(),
                "network": pending.network(),
                "explorer_url": pending.explorer_url(),
            }))?;

            if let Some(confirmations) = wait {
                let confirmation = pending
                    .wait(confirmations, Some(Duration::from_secs(timeout)))
                    .await?;
                print_json(&confirmation)?;
            }
        }
    }

    Ok(())
}

fn build_request(
    gateway: &Gateway,
    network: Option<&str>,
    to: &str,
    value: &str,
    data: Option<&str>,
) -> Result<TransactionRequest, Box<dyn std::error::Error>> {
    let profile = gateway.resolve(network)?;
    let mut request = TransactionRequest::default()
        .with_to(parse_address(to)?)
        .with_value(parse_amount(value, profile.decimals)?);

    if let Some(data) = data {
        let input = Bytes::from_str(data).map_err(|e| format!("Invalid call data: {}", e))?;
        request.set_input(input);
    }
    Ok(request)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
