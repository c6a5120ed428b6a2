//! Error types for Trezoa Pay request handling.
//!
//! Every failure surfaced by the codec, the amount converter and the
//! transfer builder is a [`TrezoaPayError`]. Domain variants carry the
//! offending input; [`TrezoaPayError::Rpc`] forwards the transport error
//! untouched so callers can apply their own retry policy.

use crate::chain::{Address, RpcError};

/// Errors produced while decoding, encoding or building payment requests.
#[derive(Debug, thiserror::Error)]
pub enum TrezoaPayError {
    /// A string did not decode to a 32-byte base58 address.
    #[error("Invalid {role} address: {input:?}")]
    InvalidAddress {
        /// Role of the address in the request (recipient, token, ...).
        role: &'static str,
        /// The rejected input.
        input: String,
    },
    /// An amount was not finite, negative, too precise or out of range.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    /// A link or URI used a scheme other than the payment scheme or `https`.
    #[error("Invalid link: {0}")]
    InvalidLink(String),
    /// The sender account does not exist on chain.
    #[error("Sender not found: {0}")]
    SenderNotFound(Address),
    /// The recipient account does not exist on chain.
    #[error("Recipient not found: {0}")]
    RecipientNotFound(Address),
    /// The token mint does not exist or is not a mint account.
    #[error("Mint not found: {0}")]
    MintNotFound(Address),
    /// The token mint exists but has not been initialized.
    #[error("Mint not initialized: {0}")]
    MintNotInitialized(Address),
    /// A transaction skeleton was assembled without a lifetime anchor.
    #[error("Transaction has no lifetime anchor")]
    MissingLifetime,
    /// A transaction skeleton was assembled without instructions.
    #[error("Transaction has no instructions")]
    EmptyTransaction,
    /// The RPC capability failed.
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

impl TrezoaPayError {
    /// Creates an [`TrezoaPayError::InvalidAddress`] for the given role and input.
    pub fn invalid_address(role: &'static str, input: impl Into<String>) -> Self {
        Self::InvalidAddress {
            role,
            input: input.into(),
        }
    }
}
