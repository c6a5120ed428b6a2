//! Well-known Trezoa program identities and token deployments.
//!
//! This module provides the default program addresses the transfer builder
//! targets and the decimals of well-known stablecoin mints, used when a
//! request amount has to be formatted or parsed without consulting the
//! ledger.

use solana_pubkey::pubkey;

use crate::chain::Address;

/// System program (native transfers).
pub const SYSTEM_PROGRAM_ID: Address =
    Address::new(pubkey!("11111111111111111111111111111111"));

/// Legacy token program.
pub const TOKEN_PROGRAM_ID: Address =
    Address::new(pubkey!("4JkrrPuuQPxDZuBW1bgrM1GBa8oYg1LxcuX9szBPh3ic"));

/// Associated token account program.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Address =
    Address::new(pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL"));

/// Memo program.
pub const MEMO_PROGRAM_ID: Address =
    Address::new(pubkey!("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr"));

/// Extended token program (token extensions).
#[must_use]
pub fn token_2022_program_id() -> Address {
    Address::new_from_array(spl_token_2022::id().to_bytes())
}

/// Decimals of the native asset.
pub const NATIVE_DECIMALS: u8 = 9;

/// A token mint together with its decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenDeployment {
    /// Mint address.
    pub mint: Address,
    /// Number of fractional digits of the token.
    pub decimals: u8,
}

impl TokenDeployment {
    /// Creates a deployment entry.
    #[must_use]
    pub const fn new(mint: Address, decimals: u8) -> Self {
        Self { mint, decimals }
    }
}

/// USDC on Trezoa mainnet.
pub const USDC: TokenDeployment = TokenDeployment::new(
    Address::new(pubkey!("EFewYfHeQhkKpbDzpmyygdT54hn85dUj3VZ8b7dC21KS")),
    6,
);

/// USDT on Trezoa mainnet.
pub const USDT: TokenDeployment = TokenDeployment::new(
    Address::new(pubkey!("GHPjs7ftoZVdvKYvnxCiRD3i5t3dNSkLyQaoBQLRb5PA")),
    6,
);

static KNOWN_TOKENS: &[TokenDeployment] = &[USDC, USDT];

/// Returns all built-in token deployments.
#[must_use]
pub fn known_tokens() -> &'static [TokenDeployment] {
    KNOWN_TOKENS
}

/// Looks up a built-in token deployment by mint.
#[must_use]
pub fn known_token(mint: &Address) -> Option<&'static TokenDeployment> {
    KNOWN_TOKENS.iter().find(|d| d.mint == *mint)
}
