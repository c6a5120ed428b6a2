//! Transfer transaction building.
//!
//! [`TransferBuilder`] turns a [`TransferRequest`] into an unsigned
//! [`TransactionSkeleton`] containing:
//!
//! 1. An optional memo instruction
//! 2. Exactly one transfer instruction: a native system transfer, or a
//!    token `TransferChecked` between associated token accounts
//!
//! Reference accounts are appended to the transfer instruction as read-only,
//! non-signer accounts so the payment can later be found by searching for
//! transactions touching them.
//!
//! The builder performs these ledger lookups, concurrently where they are
//! independent:
//!
//! - Native: sender and recipient must exist
//! - Token: sender must exist and the token must be an initialized mint
//!   owned by one of the two token programs
//! - The lifetime anchor, once the checks above have passed
//!
//! RPC failures are returned unchanged and nothing is retried.

/// Native system-program transfers.
pub mod native;

/// Token transfers and mint resolution.
pub mod token;
pub use token::{TokenInfo, TokenProgram, associated_token_address, decode_mint, fetch_mint};

use futures_util::try_join;
#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::amount::Amount;
use crate::chain::{Address, RpcCapability};
use crate::config::PayConfig;
use crate::error::TrezoaPayError;
use crate::request::TransferRequest;
use crate::transaction::{
    AccountMeta, Instruction, TRANSACTION_VERSION, TransactionSkeleton,
    TransactionSkeletonBuilder,
};

/// Asset moved by a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// The native asset.
    Native,
    /// A token identified by its mint.
    Token {
        /// Mint address.
        mint: Address,
    },
}

/// A transfer request validated for building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    /// Account receiving the payment.
    pub recipient: Address,
    /// Amount in minor units.
    pub amount: Amount,
    /// Native or token transfer.
    pub kind: TransferKind,
    /// Reference accounts, in order.
    pub references: Vec<Address>,
    /// Non-empty memo, if any.
    pub memo: Option<String>,
}

impl TryFrom<&TransferRequest> for TransferPlan {
    type Error = TrezoaPayError;

    fn try_from(request: &TransferRequest) -> Result<Self, Self::Error> {
        let amount = request.amount.ok_or_else(|| {
            TrezoaPayError::InvalidAmount(format!(
                "transfer to {} has no amount",
                request.recipient
            ))
        })?;
        let kind = request
            .token
            .map_or(TransferKind::Native, |mint| TransferKind::Token { mint });
        Ok(Self {
            recipient: request.recipient,
            amount,
            kind,
            references: request.references.clone(),
            memo: request.memo.clone().filter(|memo| !memo.is_empty()),
        })
    }
}

/// Builds transfer transactions against an RPC capability.
#[derive(Debug, Clone)]
pub struct TransferBuilder<R> {
    rpc: R,
    config: PayConfig,
}

impl<R: RpcCapability> TransferBuilder<R> {
    /// Creates a builder.
    #[must_use]
    pub const fn new(rpc: R, config: PayConfig) -> Self {
        Self { rpc, config }
    }

    /// Returns the protocol configuration.
    #[must_use]
    pub const fn config(&self) -> &PayConfig {
        &self.config
    }

    /// Builds the unsigned transaction paying `request` from `sender`.
    ///
    /// # Errors
    ///
    /// See [`create_transfer`].
    pub async fn build(
        &self,
        sender: &Address,
        request: &TransferRequest,
    ) -> Result<TransactionSkeleton, TrezoaPayError> {
        create_transfer(&self.rpc, &self.config, sender, request).await
    }
}

/// Builds the unsigned transaction paying `request` from `sender`.
///
/// # Errors
///
/// - [`TrezoaPayError::InvalidAmount`] if the request has no amount
/// - [`TrezoaPayError::SenderNotFound`] / [`TrezoaPayError::RecipientNotFound`]
///   if a native transfer party does not exist
/// - [`TrezoaPayError::MintNotFound`] / [`TrezoaPayError::MintNotInitialized`]
///   if the token is not a usable mint
/// - [`TrezoaPayError::Rpc`] if any lookup fails
#[cfg_attr(
    feature = "telemetry",
    instrument(name = "trezoa_pay.create_transfer", skip_all, err, fields(%sender))
)]
pub async fn create_transfer<R: RpcCapability + ?Sized>(
    rpc: &R,
    config: &PayConfig,
    sender: &Address,
    request: &TransferRequest,
) -> Result<TransactionSkeleton, TrezoaPayError> {
    let plan = TransferPlan::try_from(request)?;

    let mut transfer = match plan.kind {
        TransferKind::Native => {
            let (sender_account, recipient_account) = try_join!(
                rpc.get_account_info(sender),
                rpc.get_account_info(&plan.recipient)
            )?;
            if sender_account.is_none() {
                return Err(TrezoaPayError::SenderNotFound(*sender));
            }
            if recipient_account.is_none() {
                return Err(TrezoaPayError::RecipientNotFound(plan.recipient));
            }
            native::transfer_instruction(config, sender, &plan.recipient, plan.amount)?
        }
        TransferKind::Token { mint } => {
            let (sender_account, mint_account) =
                try_join!(rpc.get_account_info(sender), rpc.get_account_info(&mint))?;
            if sender_account.is_none() {
                return Err(TrezoaPayError::SenderNotFound(*sender));
            }
            let token = decode_mint(&mint, mint_account.as_ref(), config)?;
            token::transfer_checked_instruction(config, &token, sender, &plan.recipient, plan.amount)?
        }
    };
    transfer.accounts.extend(
        plan.references
            .iter()
            .map(|reference| AccountMeta::readonly(*reference, false)),
    );

    let lifetime = rpc.get_latest_lifetime_anchor().await?;

    #[cfg(feature = "telemetry")]
    tracing::debug!(
        kind = ?plan.kind,
        amount = %plan.amount,
        references = plan.references.len(),
        expiry_height = lifetime.expiry_height,
        "built transfer"
    );

    TransactionSkeletonBuilder::new(TRANSACTION_VERSION)
        .lifetime(lifetime)
        .instructions(plan.memo.as_deref().map(|memo| memo_instruction(config, memo)))
        .instruction(transfer)
        .build()
}

/// Builds a memo instruction carrying the raw memo bytes and no accounts.
#[must_use]
pub fn memo_instruction(config: &PayConfig, memo: &str) -> Instruction {
    Instruction {
        program_id: config.memo_program,
        accounts: Vec::new(),
        data: memo.as_bytes().to_vec(),
    }
}
