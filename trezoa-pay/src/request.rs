//! Logical payment requests: direct transfers and delegated transactions.
//!
//! # Key Types
//!
//! - [`TransferRequest`] - Recipient, amount and optional token, references and annotations
//! - [`TransactionRequest`] - A link to an endpoint that builds the transaction
//! - [`PaymentRequest`] - Either of the two, as produced by the URI decoder

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::chain::Address;

/// A request to transfer an amount of the native asset or a token.
///
/// `amount` is optional at the URI layer so wallets can prompt for it, but
/// the transfer builder requires it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Account receiving the payment.
    pub recipient: Address,
    /// Amount in minor units of the native asset or of `token`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    /// Token mint; absent for native transfers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Address>,
    /// Reference accounts, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Address>,
    /// Merchant or source of the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Description of the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Memo attached to the transfer transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl TransferRequest {
    /// Creates a request paying `recipient` with no other fields set.
    #[must_use]
    pub const fn new(recipient: Address) -> Self {
        Self {
            recipient,
            amount: None,
            token: None,
            references: Vec::new(),
            label: None,
            message: None,
            memo: None,
        }
    }

    /// Sets the amount in minor units.
    #[must_use]
    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Sets the token mint.
    #[must_use]
    pub fn with_token(mut self, mint: Address) -> Self {
        self.token = Some(mint);
        self
    }

    /// Appends a reference account.
    #[must_use]
    pub fn with_reference(mut self, reference: Address) -> Self {
        self.references.push(reference);
        self
    }

    /// Appends reference accounts in iteration order.
    #[must_use]
    pub fn with_references<I>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = Address>,
    {
        self.references.extend(references);
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the memo.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// A request delegating transaction construction to an external endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// Endpoint link, absolute (`https://...`) or relative to the payment scheme.
    pub link: String,
    /// Merchant or source of the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Description of the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TransactionRequest {
    /// Creates a request for `link` without label or message.
    #[must_use]
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            label: None,
            message: None,
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A decoded payment request URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PaymentRequest {
    /// Direct transfer to a recipient.
    Transfer(TransferRequest),
    /// Transaction built by an external endpoint.
    Transaction(TransactionRequest),
}

impl From<TransferRequest> for PaymentRequest {
    fn from(request: TransferRequest) -> Self {
        Self::Transfer(request)
    }
}

impl From<TransactionRequest> for PaymentRequest {
    fn from(request: TransactionRequest) -> Self {
        Self::Transaction(request)
    }
}
