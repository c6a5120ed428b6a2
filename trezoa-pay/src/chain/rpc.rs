use std::fmt;
use std::sync::Arc;

use crate::chain::Address;
use crate::transaction::LifetimeAnchor;

/// On-chain account state as seen by the transfer builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Program that owns the account.
    pub owner: Address,
    /// Raw account data.
    pub data: Vec<u8>,
    /// Whether the account holds a loaded program.
    pub executable: bool,
    /// Balance in minor units of the native asset.
    pub lamports: u64,
}

/// Opaque error raised by an [`RpcCapability`] implementation.
///
/// Display and source are forwarded to the wrapped error unchanged.
#[derive(Debug)]
pub struct RpcError(Box<dyn std::error::Error + Send + Sync>);

impl RpcError {
    /// Wraps a transport error.
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self(error.into())
    }

    /// Returns the wrapped transport error.
    #[must_use]
    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync> {
        self.0
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for RpcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

/// Read access to the ledger required to build a transfer.
///
/// Implementations own transport concerns (endpoint choice, commitment,
/// retries). The builder calls each method at most once per build and never
/// retries a failed call.
#[async_trait::async_trait]
pub trait RpcCapability: Send + Sync {
    /// Fetches an account, returning `None` when it does not exist.
    async fn get_account_info(&self, address: &Address) -> Result<Option<Account>, RpcError>;

    /// Fetches the most recent lifetime anchor for new transactions.
    async fn get_latest_lifetime_anchor(&self) -> Result<LifetimeAnchor, RpcError>;
}

#[async_trait::async_trait]
impl<T: RpcCapability + ?Sized> RpcCapability for Arc<T> {
    async fn get_account_info(&self, address: &Address) -> Result<Option<Account>, RpcError> {
        (**self).get_account_info(address).await
    }

    async fn get_latest_lifetime_anchor(&self) -> Result<LifetimeAnchor, RpcError> {
        (**self).get_latest_lifetime_anchor().await
    }
}

#[cfg(feature = "rpc-client")]
mod client {
    use solana_client::nonblocking::rpc_client::RpcClient;

    use super::{Account, RpcCapability, RpcError};
    use crate::chain::Address;
    use crate::transaction::LifetimeAnchor;

    #[async_trait::async_trait]
    impl RpcCapability for RpcClient {
        async fn get_account_info(&self, address: &Address) -> Result<Option<Account>, RpcError> {
            let response = self
                .get_account_with_commitment(address.pubkey(), self.commitment())
                .await
                .map_err(RpcError::new)?;
            Ok(response.value.map(|account| Account {
                owner: Address::new(account.owner),
                data: account.data,
                executable: account.executable,
                lamports: account.lamports,
            }))
        }

        async fn get_latest_lifetime_anchor(&self) -> Result<LifetimeAnchor, RpcError> {
            let (hash, last_valid_block_height) = self
                .get_latest_blockhash_with_commitment(self.commitment())
                .await
                .map_err(RpcError::new)?;
            Ok(LifetimeAnchor {
                hash: hash.to_string(),
                expiry_height: last_valid_block_height,
            })
        }
    }
}
