//! Command-line front end for Trezoa Pay requests.
//!
//! # Usage
//!
//! ```bash
//! # Transfer request URI for 1.5 native units
//! trezoa-pay encode --recipient 9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM --amount 1.5
//!
//! # Transaction request URI
//! trezoa-pay encode-link --link https://merchant.example/pay --label Shop
//!
//! # Decode any payment request URI to JSON
//! trezoa-pay decode "trezoa:9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM?amount=1.5"
//!
//! # Build the unsigned transfer transaction
//! RPC_URL=http://127.0.0.1:8899 trezoa-pay transfer --sender <ADDRESS> "trezoa:..."
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to TOML configuration file (default: `trezoa-pay.toml`)
//! - `RPC_URL` - RPC endpoint for `transfer`
//! - `RUST_LOG` - Log level filter (default: `info`)
//!
//! A `.env` file in the working directory is loaded first.

mod cli;
mod config;

use std::io::Write;

use clap::Parser;
use serde::Serialize;
use solana_client::nonblocking::rpc_client::RpcClient;
use tracing_subscriber::EnvFilter;
use trezoa_pay::{PaymentRequest, TransactionRequest, TransferBuilder, decode_url, encode_url};

use crate::cli::{Cli, Command};
use crate::config::CliConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout carries only command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("trezoa-pay failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::load_from(&cli.config)?;
    tracing::debug!(
        path = %cli.config,
        scheme = %config.protocol.scheme,
        known_tokens = config.protocol.known_tokens.len(),
        "Loaded configuration"
    );

    match cli.command {
        Command::Encode(args) => {
            let request = args.into_request(&config.protocol)?;
            let url = encode_url(&request.into(), &config.protocol)?;
            print_line(url.as_str())?;
        }
        Command::EncodeLink(args) => {
            let request = TransactionRequest::from(args);
            let url = encode_url(&request.into(), &config.protocol)?;
            print_line(url.as_str())?;
        }
        Command::Decode { uri } => {
            let request = decode_url(&uri, &config.protocol)?;
            print_json(&request)?;
        }
        Command::Transfer(args) => {
            let PaymentRequest::Transfer(request) = decode_url(&args.uri, &config.protocol)? else {
                return Err("transaction requests are built by the endpoint they link to".into());
            };
            let commitment = config.commitment()?;
            let rpc_url = args
                .rpc_url
                .or(config.rpc_url)
                .ok_or("no RPC endpoint: pass --rpc-url, set RPC_URL or rpc_url in the config")?;
            tracing::info!(
                rpc_url = %rpc_url,
                sender = %args.sender,
                recipient = %request.recipient,
                "Building transfer"
            );

            let rpc = RpcClient::new_with_commitment(rpc_url, commitment);
            let builder = TransferBuilder::new(rpc, config.protocol);
            let skeleton = builder.build(&args.sender, &request).await?;
            print_json(&skeleton)?;
        }
    }

    Ok(())
}

fn print_line(line: &str) -> std::io::Result<()> {
    writeln!(std::io::stdout().lock(), "{line}")
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    print_line(&serde_json::to_string_pretty(value)?)?;
    Ok(())
}
