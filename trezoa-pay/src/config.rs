//! Protocol configuration shared by the URI codec and the transfer builder.
//!
//! [`PayConfig`] is an immutable value carrying the URI scheme, the program
//! identities instructions are addressed to, the native asset's decimals and
//! a table of known token decimals. It is built once (usually with
//! [`PayConfig::default`] or from a TOML file) and passed by reference into
//! every operation.
//!
//! # Example Configuration
//!
//! ```toml
//! scheme = "trezoa"
//! native_decimals = 9
//! memo_program = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr"
//!
//! [known_tokens]
//! EFewYfHeQhkKpbDzpmyygdT54hn85dUj3VZ8b7dC21KS = 6
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chain::Address;
use crate::networks::{self, NATIVE_DECIMALS};
use crate::transfer::TokenProgram;

/// Protocol constants for payment requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayConfig {
    /// URI scheme of transfer requests (default: `trezoa`).
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Decimals of the native asset (default: `9`).
    #[serde(default = "default_native_decimals")]
    pub native_decimals: u8,

    /// Program executing native transfers.
    #[serde(default = "default_system_program")]
    pub system_program: Address,

    /// Legacy token program.
    #[serde(default = "default_token_program")]
    pub token_program: Address,

    /// Extended token program.
    #[serde(default = "default_token_2022_program")]
    pub token_2022_program: Address,

    /// Program deriving associated token accounts.
    #[serde(default = "default_associated_token_program")]
    pub associated_token_program: Address,

    /// Program receiving memo instructions.
    #[serde(default = "default_memo_program")]
    pub memo_program: Address,

    /// Decimals of tokens known without a ledger lookup, keyed by mint.
    #[serde(default = "default_known_tokens")]
    pub known_tokens: BTreeMap<Address, u8>,
}

fn default_scheme() -> String {
    "trezoa".to_owned()
}

const fn default_native_decimals() -> u8 {
    NATIVE_DECIMALS
}

const fn default_system_program() -> Address {
    networks::SYSTEM_PROGRAM_ID
}

const fn default_token_program() -> Address {
    networks::TOKEN_PROGRAM_ID
}

fn default_token_2022_program() -> Address {
    networks::token_2022_program_id()
}

const fn default_associated_token_program() -> Address {
    networks::ASSOCIATED_TOKEN_PROGRAM_ID
}

const fn default_memo_program() -> Address {
    networks::MEMO_PROGRAM_ID
}

fn default_known_tokens() -> BTreeMap<Address, u8> {
    networks::known_tokens()
        .iter()
        .map(|d| (d.mint, d.decimals))
        .collect()
}

impl Default for PayConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            native_decimals: default_native_decimals(),
            system_program: default_system_program(),
            token_program: default_token_program(),
            token_2022_program: default_token_2022_program(),
            associated_token_program: default_associated_token_program(),
            memo_program: default_memo_program(),
            known_tokens: default_known_tokens(),
        }
    }
}

impl PayConfig {
    /// Decimals used to format or parse an amount of `token`.
    ///
    /// Known tokens use their table entry; unknown tokens and the native
    /// asset (`None`) use [`PayConfig::native_decimals`].
    #[must_use]
    pub fn decimals_for(&self, token: Option<&Address>) -> u8 {
        token
            .and_then(|mint| self.known_tokens.get(mint))
            .copied()
            .unwrap_or(self.native_decimals)
    }

    /// Classifies an account owner as one of the two token programs.
    #[must_use]
    pub fn token_program_kind(&self, owner: &Address) -> Option<TokenProgram> {
        if *owner == self.token_program {
            Some(TokenProgram::Legacy)
        } else if *owner == self.token_2022_program {
            Some(TokenProgram::Extended)
        } else {
            None
        }
    }

    /// Address of the given token program.
    #[must_use]
    pub const fn token_program_id(&self, program: TokenProgram) -> Address {
        match program {
            TokenProgram::Legacy => self.token_program,
            TokenProgram::Extended => self.token_2022_program,
        }
    }
}
