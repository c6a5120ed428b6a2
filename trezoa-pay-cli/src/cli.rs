use clap::{Args, Parser, Subcommand};
use trezoa_pay::chain::{parse_recipient, parse_reference, parse_token};
use trezoa_pay::{
    Address, PayConfig, TransactionRequest, TransferRequest, TrezoaPayError, parse_decimal_amount,
};

/// Encode, decode and build Trezoa Pay payment requests.
#[derive(Debug, Parser)]
#[command(name = "trezoa-pay", version, about)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "CONFIG", default_value = "trezoa-pay.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a transfer request URI.
    Encode(EncodeArgs),
    /// Build a transaction request URI.
    EncodeLink(EncodeLinkArgs),
    /// Decode a payment request URI and print it as JSON.
    Decode {
        /// The URI to decode.
        uri: String,
    },
    /// Build the unsigned transaction for a transfer request URI and print it as JSON.
    Transfer(TransferArgs),
}

#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// Account receiving the payment.
    #[arg(long, value_parser = parse_recipient)]
    pub recipient: Address,

    /// Amount as a decimal number of whole units (e.g. `1.5`).
    #[arg(long)]
    pub amount: Option<String>,

    /// Token mint; omit for the native asset.
    #[arg(long, value_parser = parse_token)]
    pub token: Option<Address>,

    /// Reference account, repeatable.
    #[arg(long = "reference", value_parser = parse_reference)]
    pub references: Vec<Address>,

    /// Merchant or source of the request.
    #[arg(long)]
    pub label: Option<String>,

    /// Description of the request.
    #[arg(long)]
    pub message: Option<String>,

    /// Memo attached to the transfer transaction.
    #[arg(long)]
    pub memo: Option<String>,
}

impl EncodeArgs {
    /// Converts the arguments into a request, scaling the amount by the
    /// decimals of the token (or the native asset).
    pub fn into_request(self, config: &PayConfig) -> Result<TransferRequest, TrezoaPayError> {
        let amount = self
            .amount
            .as_deref()
            .map(|amount| parse_decimal_amount(amount, config.decimals_for(self.token.as_ref())))
            .transpose()?;
        Ok(TransferRequest {
            recipient: self.recipient,
            amount,
            token: self.token,
            references: self.references,
            label: self.label,
            message: self.message,
            memo: self.memo,
        })
    }
}

#[derive(Debug, Args)]
pub struct EncodeLinkArgs {
    /// Endpoint building the transaction (`https://...` or scheme-relative).
    #[arg(long)]
    pub link: String,

    /// Merchant or source of the request.
    #[arg(long)]
    pub label: Option<String>,

    /// Description of the request.
    #[arg(long)]
    pub message: Option<String>,
}

impl From<EncodeLinkArgs> for TransactionRequest {
    fn from(args: EncodeLinkArgs) -> Self {
        Self {
            link: args.link,
            label: args.label,
            message: args.message,
        }
    }
}

#[derive(Debug, Args)]
pub struct TransferArgs {
    /// Account paying the transfer.
    #[arg(long, value_parser = Address::parse)]
    pub sender: Address,

    /// HTTP RPC endpoint, overriding `rpc_url` from the config file.
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Transfer request URI.
    pub uri: String,
}
