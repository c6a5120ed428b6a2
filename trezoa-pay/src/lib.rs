#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Trezoa Pay payment requests for Rust.
//!
//! A merchant asks a payer for a fungible asset, either the network's native
//! coin or a token identified by its mint. The request travels as a
//! scannable URI, or is turned directly into an unsigned transfer
//! transaction for an external signer.
//!
//! # Architecture
//!
//! - [`chain`] - Account addresses and the RPC capability the builder consumes
//! - [`amount`] - Exact conversion between decimal amounts and minor units
//! - [`uri`] - The payment request URI codec
//! - [`transfer`] - Native and token transfer instruction building
//! - [`transaction`] - The unsigned transaction skeleton and its assembler
//! - [`config`] - Protocol constants passed into every operation
//! - [`networks`] - Well-known program identities and token deployments
//!
//! # Feature Flags
//!
//! - `telemetry` - `tracing` spans and events
//! - `rpc-client` - [`chain::RpcCapability`] for the nonblocking `RpcClient`
//!
//! # Usage
//!
//! ```ignore
//! use trezoa_pay::{PayConfig, TransferRequest, encode_url, to_minor_units, create_transfer};
//!
//! let config = PayConfig::default();
//! let request = TransferRequest::new("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM".parse()?)
//!     .with_amount(to_minor_units(1.5, 9)?);
//!
//! // trezoa:9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM?amount=1.5
//! let uri = encode_url(&request.clone().into(), &config)?;
//!
//! let skeleton = create_transfer(&rpc_client, &config, &sender, &request).await?;
//! ```

pub mod amount;
pub mod chain;
pub mod config;
pub mod error;
pub mod networks;
pub mod request;
pub mod transaction;
pub mod transfer;
pub mod uri;

pub use amount::{Amount, parse_decimal_amount, to_decimal_string, to_minor_units};
pub use chain::{Account, Address, RpcCapability, RpcError, is_valid_address};
pub use config::PayConfig;
pub use error::TrezoaPayError;
pub use request::{PaymentRequest, TransactionRequest, TransferRequest};
pub use transaction::{
    AccountMeta, Instruction, LifetimeAnchor, TransactionSkeleton, TransactionSkeletonBuilder,
};
pub use transfer::{TransferBuilder, TransferKind, create_transfer};
pub use uri::{decode_url, encode_url};
