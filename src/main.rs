//! TokenForge - create an SPL token mint from the terminal
//!
//! Thin front end over [`tokenforge::MintPipeline`]: reads the form fields from the
//! command line, loads the payer keypair, runs one attempt and prints every status
//! transition as it happens.
//!
//! Exit status is `0` on confirmation, `2` when the transaction was sent but its
//! outcome is unknown, and `1` for every other failure.

// Compiler warning configuration
#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(dead_code)]
#![warn(unused_must_use)]

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tokenforge::config::Config;
use tokenforge::ledger::RpcLedger;
use tokenforge::metrics;
use tokenforge::mint::RawMintParams;
use tokenforge::wallet::WalletManager;
use tokenforge::{AttemptStatus, MintPipeline, MintReceipt, PipelineConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Token name
    #[arg(long)]
    name: String,

    /// Token symbol
    #[arg(long)]
    symbol: String,

    /// Decimal places (0-9)
    #[arg(long, default_value = "6")]
    decimals: String,

    /// Initial supply in whole tokens; a fractional part is truncated
    #[arg(long)]
    supply: String,

    /// Keep the wallet as freeze authority
    #[arg(long)]
    freeze: bool,

    /// Payer keypair file (overrides config)
    #[arg(long, env = "TOKENFORGE_KEYPAIR")]
    keypair: Option<String>,

    /// JSON-RPC endpoint (overrides config)
    #[arg(long, env = "TOKENFORGE_RPC_URL")]
    rpc_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print Prometheus metrics after the attempt
    #[arg(long)]
    print_metrics: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    init_logging(args.verbose)?;
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(&args.config)?;
    if let Some(path) = &args.keypair {
        config.wallet.keypair_path = path.clone();
    }
    if let Some(url) = &args.rpc_url {
        config.rpc.url = url.clone();
    }
    config.validate().context("Invalid configuration")?;

    info!("Loading wallet from: {}", config.wallet.keypair_path);
    let wallet =
        WalletManager::from_file(&config.wallet.keypair_path).context("Failed to load wallet")?;
    info!("Wallet address: {}", wallet.pubkey());

    let ledger = RpcLedger::new(&config.rpc).context("Failed to create ledger connection")?;
    info!("Ledger endpoint: {}", ledger.endpoint());

    let pipeline = MintPipeline::new(
        Arc::new(ledger),
        Arc::new(wallet),
        PipelineConfig {
            commitment: config.rpc.commitment_config()?,
            record_metrics: config.monitoring.enable_metrics,
        },
    );

    let params = RawMintParams {
        name: args.name,
        symbol: args.symbol,
        decimals: args.decimals,
        initial_supply: args.supply,
        freeze_enabled: args.freeze,
    };

    let mut statuses = pipeline.create_mint_stream(params);
    let mut outcome = AttemptStatus::Idle;
    while let Some(status) = statuses.next().await {
        println!("{}", status);
        outcome = status;
    }

    if args.print_metrics && config.monitoring.enable_metrics {
        print!("{}", metrics::metrics().export()?);
    }

    Ok(match outcome {
        AttemptStatus::Succeeded(receipt) => {
            println!("{}", render_receipt(&receipt));
            ExitCode::SUCCESS
        }
        AttemptStatus::ConfirmationTimeout(_) => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    })
}

/// Receipt lines shown after a confirmed attempt
fn render_receipt(receipt: &MintReceipt) -> String {
    format!(
        "Mint: {}\nHolding account: {}\nTransaction: {}\n\
         Note: name and symbol are not stored on-chain by this tool.",
        receipt.mint_address, receipt.holding_account_address, receipt.transaction_signature
    )
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        "tokenforge=debug,info"
    } else {
        "tokenforge=info,warn,error"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    Ok(())
}

/// Load configuration from file with fallback to defaults
fn load_config(path: &str) -> Result<Config> {
    if std::path::Path::new(path).exists() {
        Config::from_file_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path))
    } else {
        warn!("Config file '{}' not found, using defaults", path);
        dotenvy::dotenv().ok();
        let mut config = Config::default();
        config.apply_env_overrides();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "tokenforge",
            "--name",
            "Forge",
            "--symbol",
            "FRG",
            "--decimals",
            "6",
            "--supply",
            "1000",
            "--freeze",
        ])
        .unwrap();
        assert_eq!(args.decimals, "6");
        assert_eq!(args.supply, "1000");
        assert!(args.freeze);
        assert!(!args.print_metrics);
    }

    #[test]
    fn test_decimals_default_to_six() {
        let args =
            Args::try_parse_from(["tokenforge", "--name", "A", "--symbol", "B", "--supply", "1"])
                .unwrap();
        assert_eq!(args.decimals, "6");
        assert!(!args.freeze);
    }

    #[test]
    fn test_receipt_mentions_offchain_name_and_symbol() {
        let receipt = MintReceipt {
            mint_address: tokenforge::Pubkey::new_unique(),
            holding_account_address: tokenforge::Pubkey::new_unique(),
            transaction_signature: tokenforge::Signature::default(),
        };
        let text = render_receipt(&receipt);
        assert!(text.contains(&receipt.mint_address.to_string()));
        assert!(text.contains(&receipt.holding_account_address.to_string()));
        assert!(text.contains("not stored on-chain"));
    }

    #[test]
    fn test_args_require_supply() {
        assert!(Args::try_parse_from(["tokenforge", "--name", "A", "--symbol", "B"]).is_err());
    }

    #[test]
    fn test_load_missing_config_uses_defaults() {
        let config = load_config("/nonexistent/tokenforge.toml").unwrap();
        assert!(config.validate().is_ok());
    }
}
