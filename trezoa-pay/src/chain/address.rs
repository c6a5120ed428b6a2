use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use solana_pubkey::Pubkey;
use std::fmt;
use std::str::FromStr;

use crate::error::TrezoaPayError;

/// Number of bytes in a decoded address.
pub const ADDRESS_BYTES: usize = 32;

/// Longest base58 string that can encode [`ADDRESS_BYTES`] bytes.
const MAX_BASE58_LEN: usize = 44;

/// A ledger account address.
///
/// Addresses are exactly 32 bytes and travel as base58 strings using the
/// bitcoin alphabet. Only the canonical encoding of those bytes is accepted,
/// so two distinct strings never parse to the same address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(Pubkey);

impl Address {
    /// Wraps an existing public key.
    #[must_use]
    pub const fn new(pubkey: Pubkey) -> Self {
        Self(pubkey)
    }

    /// Creates an address from its raw bytes.
    #[must_use]
    pub const fn new_from_array(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(Pubkey::new_from_array(bytes))
    }

    /// Returns the underlying public key.
    #[must_use]
    pub const fn pubkey(&self) -> &Pubkey {
        &self.0
    }

    /// Returns the raw address bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; ADDRESS_BYTES] {
        self.0.to_bytes()
    }

    /// Parses a base58 address.
    ///
    /// # Errors
    ///
    /// Returns [`TrezoaPayError::InvalidAddress`] unless `s` is the canonical
    /// base58 encoding of exactly 32 bytes.
    pub fn parse(s: &str) -> Result<Self, TrezoaPayError> {
        parse_with_role(s, "account")
    }
}

pub(crate) fn parse_with_role(s: &str, role: &'static str) -> Result<Address, TrezoaPayError> {
    if s.is_empty() || s.len() > MAX_BASE58_LEN {
        return Err(TrezoaPayError::invalid_address(role, s));
    }
    let decoded = bs58::decode(s)
        .into_vec()
        .map_err(|_| TrezoaPayError::invalid_address(role, s))?;
    let bytes: [u8; ADDRESS_BYTES] = decoded
        .as_slice()
        .try_into()
        .map_err(|_| TrezoaPayError::invalid_address(role, s))?;
    let address = Address::new_from_array(bytes);
    if address.to_string() != s {
        return Err(TrezoaPayError::invalid_address(role, s));
    }
    Ok(address)
}

/// Returns `true` iff [`Address::parse`] accepts `s`.
#[must_use]
pub fn is_valid_address(s: &str) -> bool {
    Address::parse(s).is_ok()
}

/// Parses the recipient of a payment request.
///
/// # Errors
///
/// Returns [`TrezoaPayError::InvalidAddress`] naming the recipient role.
pub fn parse_recipient(s: &str) -> Result<Address, TrezoaPayError> {
    parse_with_role(s, "recipient")
}

/// Parses the token mint of a payment request.
///
/// # Errors
///
/// Returns [`TrezoaPayError::InvalidAddress`] naming the token role.
pub fn parse_token(s: &str) -> Result<Address, TrezoaPayError> {
    parse_with_role(s, "token")
}

/// Parses a reference address of a payment request.
///
/// # Errors
///
/// Returns [`TrezoaPayError::InvalidAddress`] naming the reference role.
pub fn parse_reference(s: &str) -> Result<Address, TrezoaPayError> {
    parse_with_role(s, "reference")
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0.as_ref()).into_string())
    }
}

impl FromStr for Address {
    type Err = TrezoaPayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl From<Pubkey> for Address {
    fn from(pubkey: Pubkey) -> Self {
        Self(pubkey)
    }
}

impl From<Address> for Pubkey {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_ADDRESSES: &[&str] = &[
        "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
        "EFewYfHeQhkKpbDzpmyygdT54hn85dUj3VZ8b7dC21KS",
        "4JkrrPuuQPxDZuBW1bgrM1GBa8oYg1LxcuX9szBPh3ic",
        "11111111111111111111111111111111",
        "11111111111111111111111111111112",
        "Vote111111111111111111111111111111111111111",
        "So11111111111111111111111111111111111111112",
    ];

    const INVALID_ADDRESSES: &[&str] = &[
        "",
        "invalid",
        "short",
        "invalid-chars!@#$%",
        "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAW0",
        "VeryLongAddressThatExceedsTheMaximumAllowedLengthForTrezoaAddresses123456789",
    ];

    #[test]
    fn test_parse_valid_addresses_preserves_text() {
        for s in VALID_ADDRESSES {
            let address = Address::parse(s).unwrap();
            assert_eq!(address.to_string(), *s);
        }
    }

    #[test]
    fn test_parse_rejects_invalid_addresses() {
        for s in INVALID_ADDRESSES {
            assert!(Address::parse(s).is_err(), "{s} should be rejected");
        }
    }

    #[test]
    fn test_is_valid_agrees_with_parse() {
        for s in VALID_ADDRESSES.iter().chain(INVALID_ADDRESSES) {
            assert_eq!(is_valid_address(s), Address::parse(s).is_ok());
        }
    }

    #[test]
    fn test_system_program_is_all_zero_bytes() {
        let address = Address::parse("11111111111111111111111111111111").unwrap();
        assert_eq!(address.to_bytes(), [0u8; ADDRESS_BYTES]);
    }

    #[test]
    fn test_non_canonical_leading_ones_rejected() {
        // An extra leading '1' adds a zero byte, giving 33 bytes.
        assert!(Address::parse("111111111111111111111111111111111").is_err());
    }

    #[test]
    fn test_casing_is_significant() {
        let original = Address::parse("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM").unwrap();
        // Upper-casing produces a different but well-formed address.
        let upper = Address::parse("9WZDXWBBMKG8ZTBNMQUXVQRAYRZZDSGYDLVL9ZYTAWWM").unwrap();
        assert_ne!(original, upper);
        // Lower-casing introduces 'l', which is outside the alphabet.
        assert!(Address::parse("9wzdxwbbmkg8ztbnmquxvqrayrzzdsgydlvl9zytawwm").is_err());
    }

    #[test]
    fn test_role_in_error_message() {
        let err = parse_recipient("invalid-address").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid recipient address: \"invalid-address\""
        );
        let err = parse_token("").unwrap_err();
        assert!(err.to_string().starts_with("Invalid token address"));
    }

    #[test]
    fn test_serde_as_base58_string() {
        let address = Address::parse(VALID_ADDRESSES[0]).unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{}\"", VALID_ADDRESSES[0]));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
        assert!(serde_json::from_str::<Address>("\"short\"").is_err());
    }
}
