use serde::{Deserialize, Serialize};
use solana_pubkey::Pubkey;
use spl_token::instruction::TokenInstruction;
use spl_token::solana_program::program_pack::Pack;
use spl_token::state::Mint;
use spl_token_2022::extension::StateWithExtensions;
use spl_token_2022::state::Mint as ExtendedMint;

use crate::amount::Amount;
use crate::chain::{Account, Address, RpcCapability};
use crate::config::PayConfig;
use crate::error::TrezoaPayError;
use crate::transaction::{AccountMeta, Instruction};

/// Token program owning a mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenProgram {
    /// The legacy token program.
    Legacy,
    /// The extended token program (token extensions).
    Extended,
}

/// A resolved token mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    /// Mint address.
    pub mint: Address,
    /// Number of fractional digits.
    pub decimals: u8,
    /// Program owning the mint.
    pub program: TokenProgram,
}

/// Fetches and decodes a mint account.
///
/// # Errors
///
/// Returns [`TrezoaPayError::Rpc`] if the lookup fails, otherwise the errors
/// of [`decode_mint`].
pub async fn fetch_mint<R: RpcCapability + ?Sized>(
    rpc: &R,
    mint: &Address,
    config: &PayConfig,
) -> Result<TokenInfo, TrezoaPayError> {
    let account = rpc.get_account_info(mint).await?;
    decode_mint(mint, account.as_ref(), config)
}

/// Decodes a mint account fetched from the ledger.
///
/// The owner selects the token program. Legacy mints are exactly
/// [`Mint::LEN`] bytes; extended mints may carry extensions after the base
/// state.
///
/// # Errors
///
/// - [`TrezoaPayError::MintNotFound`] if the account is absent, not owned by
///   a token program, or does not hold a mint
/// - [`TrezoaPayError::MintNotInitialized`] if the mint is not initialized
pub fn decode_mint(
    mint: &Address,
    account: Option<&Account>,
    config: &PayConfig,
) -> Result<TokenInfo, TrezoaPayError> {
    let not_found = || TrezoaPayError::MintNotFound(*mint);

    let account = account.ok_or_else(not_found)?;
    let program = config
        .token_program_kind(&account.owner)
        .ok_or_else(not_found)?;
    let (decimals, is_initialized) = unpack_mint(program, &account.data).ok_or_else(not_found)?;
    if !is_initialized {
        return Err(TrezoaPayError::MintNotInitialized(*mint));
    }

    #[cfg(feature = "telemetry")]
    tracing::debug!(%mint, decimals, ?program, "decoded mint");

    Ok(TokenInfo {
        mint: *mint,
        decimals,
        program,
    })
}

/// Returns `(decimals, is_initialized)` if `data` holds a mint of `program`.
fn unpack_mint(program: TokenProgram, data: &[u8]) -> Option<(u8, bool)> {
    match program {
        TokenProgram::Legacy => Mint::unpack_unchecked(data)
            .ok()
            .map(|state| (state.decimals, state.is_initialized)),
        TokenProgram::Extended => match StateWithExtensions::<ExtendedMint>::unpack(data) {
            Ok(state) => Some((state.base.decimals, true)),
            // Unpacking rejects uninitialized mints before looking at extensions.
            Err(_) => data
                .get(..ExtendedMint::LEN)
                .and_then(|base| ExtendedMint::unpack_unchecked(base).ok())
                .filter(|base| !base.is_initialized)
                .map(|base| (base.decimals, false)),
        },
    }
}

/// Derives the associated token account of `owner` for `mint`.
#[must_use]
pub fn associated_token_address(
    owner: &Address,
    mint: &Address,
    token_program: &Address,
    associated_token_program: &Address,
) -> Address {
    let (address, _) = Pubkey::find_program_address(
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
        associated_token_program.pubkey(),
    );
    Address::new(address)
}

/// Builds a `TransferChecked` between the associated accounts of `sender`
/// and `recipient`, authorized by `sender`.
///
/// Accounts: `[source (writable), mint, destination (writable), sender (signer)]`.
///
/// # Errors
///
/// Returns [`TrezoaPayError::InvalidAmount`] if `amount` exceeds `u64::MAX`.
pub fn transfer_checked_instruction(
    config: &PayConfig,
    token: &TokenInfo,
    sender: &Address,
    recipient: &Address,
    amount: Amount,
) -> Result<Instruction, TrezoaPayError> {
    let program_id = config.token_program_id(token.program);
    let source = associated_token_address(
        sender,
        &token.mint,
        &program_id,
        &config.associated_token_program,
    );
    let destination = associated_token_address(
        recipient,
        &token.mint,
        &program_id,
        &config.associated_token_program,
    );
    let data = TokenInstruction::TransferChecked {
        amount: amount.to_ledger_units()?,
        decimals: token.decimals,
    }
    .pack();

    Ok(Instruction {
        program_id,
        accounts: vec![
            AccountMeta::writable(source, false),
            AccountMeta::readonly(token.mint, false),
            AccountMeta::writable(destination, false),
            AccountMeta::readonly(*sender, true),
        ],
        data,
    })
}
