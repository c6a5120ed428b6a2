//! Command-line configuration.
//!
//! Loads configuration from a TOML file with support for environment variable
//! expansion in string values. Variables use `$VAR` or `${VAR}` syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! rpc_url = "https://rpc.example.com/?api-key=${RPC_API_KEY}"
//! commitment = "confirmed"
//!
//! [protocol]
//! scheme = "trezoa"
//!
//! [protocol.known_tokens]
//! EFewYfHeQhkKpbDzpmyygdT54hn85dUj3VZ8b7dC21KS = 6
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to configuration file (default: `trezoa-pay.toml`)
//! - `RPC_URL` - RPC endpoint, overriding `rpc_url`

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_commitment_config::{CommitmentConfig, CommitmentLevel};
use trezoa_pay::PayConfig;

/// Top-level CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// HTTP RPC endpoint used by `transfer`.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Commitment level for account and blockhash lookups (default: `confirmed`).
    #[serde(default = "default_commitment")]
    pub commitment: String,

    /// Protocol constants.
    #[serde(default)]
    pub protocol: PayConfig,
}

fn default_commitment() -> String {
    "confirmed".to_owned()
}

impl CliConfig {
    /// Loads configuration from a specific file path.
    ///
    /// A missing file yields the defaults. All `$VAR` / `${VAR}` references
    /// are expanded from the process environment before parsing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = if Path::new(path).exists() {
            std::fs::read_to_string(path)?
        } else {
            String::new()
        };
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let expanded = expand_env_vars(content);
        Ok(toml::from_str(&expanded)?)
    }

    /// Parses the configured commitment level.
    ///
    /// # Errors
    ///
    /// Returns an error if the level is not `processed`, `confirmed` or `finalized`.
    pub fn commitment(&self) -> Result<CommitmentConfig, Box<dyn std::error::Error>> {
        let commitment = CommitmentLevel::from_str(&self.commitment)
            .map_err(|e| format!("invalid commitment {:?}: {e}", self.commitment))?;
        Ok(CommitmentConfig { commitment })
    }
}

/// Expands `$VAR` and `${VAR}` patterns in a string from environment variables.
///
/// Unresolved variables are left as-is.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        let braced = chars.next_if_eq(&'{').is_some();
        let mut name = String::new();
        let mut closed = false;
        while let Some(&c) = chars.peek() {
            if braced && c == '}' {
                chars.next();
                closed = true;
                break;
            }
            if !braced && !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            name.push(c);
            chars.next();
        }

        match std::env::var(&name) {
            Ok(value) if !name.is_empty() => result.push_str(&value),
            _ => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&name);
                if closed {
                    result.push('}');
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CliConfig::parse("").unwrap();
        assert!(config.rpc_url.is_none());
        assert_eq!(config.commitment, "confirmed");
        assert_eq!(config.protocol, PayConfig::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = CliConfig::load_from("does-not-exist/trezoa-pay.toml").unwrap();
        assert_eq!(config.protocol.scheme, "trezoa");
    }

    #[test]
    fn test_protocol_section() {
        let config = CliConfig::parse(
            r#"
            rpc_url = "http://127.0.0.1:8899"
            commitment = "finalized"

            [protocol]
            scheme = "pay"
            native_decimals = 6

            [protocol.known_tokens]
            11111111111111111111111111111112 = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.rpc_url.as_deref(), Some("http://127.0.0.1:8899"));
        assert_eq!(config.protocol.scheme, "pay");
        assert_eq!(config.protocol.native_decimals, 6);
        assert_eq!(config.protocol.known_tokens.len(), 1);
        assert_eq!(
            config.commitment().unwrap(),
            CommitmentConfig::finalized()
        );
    }

    #[test]
    fn test_invalid_commitment() {
        let config = CliConfig::parse(r#"commitment = "eventually""#).unwrap();
        assert!(config.commitment().is_err());
    }

    #[test]
    fn test_unresolved_variables_left_as_is() {
        let input = "a = \"$TREZOA_PAY_UNSET_VAR\" b = \"${TREZOA_PAY_UNSET_VAR}\" c = \"$\"";
        assert_eq!(expand_env_vars(input), input);
    }

    #[test]
    fn test_unterminated_brace_left_as_is() {
        assert_eq!(expand_env_vars("x${TREZOA_PAY_UNSET"), "x${TREZOA_PAY_UNSET");
    }
}
