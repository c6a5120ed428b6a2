use crate::amount::Amount;
use crate::chain::Address;
use crate::config::PayConfig;
use crate::error::TrezoaPayError;
use crate::transaction::{AccountMeta, Instruction};

/// System program instruction index of `Transfer`.
const SYSTEM_TRANSFER_INDEX: u32 = 2;

/// Builds a system-program transfer of `amount` native minor units.
///
/// Accounts: `[from (writable, signer), to (writable)]`. Data: the
/// instruction index as `u32` followed by the amount as `u64`, both
/// little-endian.
///
/// # Errors
///
/// Returns [`TrezoaPayError::InvalidAmount`] if `amount` exceeds `u64::MAX`.
pub fn transfer_instruction(
    config: &PayConfig,
    from: &Address,
    to: &Address,
    amount: Amount,
) -> Result<Instruction, TrezoaPayError> {
    let lamports = amount.to_ledger_units()?;
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    Ok(Instruction {
        program_id: config.system_program,
        accounts: vec![
            AccountMeta::writable(*from, true),
            AccountMeta::writable(*to, false),
        ],
        data,
    })
}
