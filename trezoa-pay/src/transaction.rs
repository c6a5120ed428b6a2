//! Unsigned transaction skeletons handed to an external signer.
//!
//! A [`TransactionSkeleton`] is the final product of the transfer builder:
//! a version tag, a lifetime anchor and an ordered, non-empty list of
//! instructions. It is assembled stepwise with [`TransactionSkeletonBuilder`]
//! and is immutable once built.

use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::serde_as;

use crate::chain::Address;
use crate::error::TrezoaPayError;

/// Transaction format version produced by the transfer builder.
pub const TRANSACTION_VERSION: u8 = 0;

/// Recent block reference that bounds how long a transaction stays valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifetimeAnchor {
    /// Base58 hash of the anchoring block.
    pub hash: String,
    /// Last block height at which the transaction may land.
    pub expiry_height: u64,
}

/// An account referenced by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountMeta {
    /// Account address.
    pub address: Address,
    /// Whether the account must sign the transaction.
    pub is_signer: bool,
    /// Whether the instruction may modify the account.
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account, optionally signing.
    #[must_use]
    pub const fn writable(address: Address, is_signer: bool) -> Self {
        Self {
            address,
            is_signer,
            is_writable: true,
        }
    }

    /// A read-only account, optionally signing.
    #[must_use]
    pub const fn readonly(address: Address, is_signer: bool) -> Self {
        Self {
            address,
            is_signer,
            is_writable: false,
        }
    }
}

/// A single program invocation.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    /// Program that executes the instruction.
    pub program_id: Address,
    /// Accounts passed to the program, in order.
    pub accounts: Vec<AccountMeta>,
    /// Opaque instruction data (base64 on the wire).
    #[serde_as(as = "Base64")]
    pub data: Vec<u8>,
}

/// An unsigned transaction: version, lifetime and ordered instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSkeleton {
    version: u8,
    lifetime: LifetimeAnchor,
    instructions: Vec<Instruction>,
}

impl TransactionSkeleton {
    /// Starts a new skeleton with the given format version.
    #[must_use]
    pub fn builder(version: u8) -> TransactionSkeletonBuilder {
        TransactionSkeletonBuilder::new(version)
    }

    /// Transaction format version.
    #[must_use]
    pub const fn version(&self) -> u8 {
        self.version
    }

    /// Lifetime anchor the transaction is bound to.
    #[must_use]
    pub const fn lifetime(&self) -> &LifetimeAnchor {
        &self.lifetime
    }

    /// Instructions in execution order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Consumes the skeleton and returns its instructions.
    #[must_use]
    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }
}

/// Stepwise assembler for [`TransactionSkeleton`].
#[derive(Debug, Clone, Default)]
pub struct TransactionSkeletonBuilder {
    version: u8,
    lifetime: Option<LifetimeAnchor>,
    instructions: Vec<Instruction>,
}

impl TransactionSkeletonBuilder {
    /// Creates an empty builder for the given format version.
    #[must_use]
    pub const fn new(version: u8) -> Self {
        Self {
            version,
            lifetime: None,
            instructions: Vec::new(),
        }
    }

    /// Sets the lifetime anchor, replacing any previous one.
    #[must_use]
    pub fn lifetime(mut self, anchor: LifetimeAnchor) -> Self {
        self.lifetime = Some(anchor);
        self
    }

    /// Appends one instruction.
    #[must_use]
    pub fn instruction(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Appends instructions in iteration order.
    #[must_use]
    pub fn instructions<I>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = Instruction>,
    {
        self.instructions.extend(instructions);
        self
    }

    /// Finishes the skeleton.
    ///
    /// # Errors
    ///
    /// Returns [`TrezoaPayError::MissingLifetime`] if no anchor was set and
    /// [`TrezoaPayError::EmptyTransaction`] if no instruction was appended.
    pub fn build(self) -> Result<TransactionSkeleton, TrezoaPayError> {
        let lifetime = self.lifetime.ok_or(TrezoaPayError::MissingLifetime)?;
        if self.instructions.is_empty() {
            return Err(TrezoaPayError::EmptyTransaction);
        }
        Ok(TransactionSkeleton {
            version: self.version,
            lifetime,
            instructions: self.instructions,
        })
    }
}
