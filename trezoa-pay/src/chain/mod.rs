//! Ledger-facing primitives: account addresses and the RPC capability.
//!
//! # Key Types
//!
//! - [`Address`] - A 32-byte account identifier, base58-encoded on the wire
//! - [`RpcCapability`] - The account and lifetime lookups the transfer builder needs
//! - [`Account`] - The subset of on-chain account state the builder inspects

/// Account address parsing and validation.
pub mod address;
pub use address::*;

/// RPC capability consumed by the transfer builder.
pub mod rpc;
pub use rpc::*;
