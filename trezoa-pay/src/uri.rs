//! Payment request URI codec.
//!
//! Two URI forms are supported:
//!
//! - Transfer requests:
//!   `<scheme>:<recipient>?amount=<decimal>&tpl-token=<mint>&reference=<addr>&label=<text>&message=<text>&memo=<text>`
//! - Transaction requests: `<scheme-or-https>:<link>?label=<text>&message=<text>`
//!
//! All query parameters are optional and `reference` may repeat. Decoding is
//! all-or-nothing: any malformed field fails the whole URI.

use url::{ParseError, Url};

use crate::amount::parse_decimal_amount;
use crate::chain::{parse_recipient, parse_reference, parse_token};
use crate::config::PayConfig;
use crate::error::TrezoaPayError;
use crate::request::{PaymentRequest, TransactionRequest, TransferRequest};

const HTTPS_SCHEME: &str = "https";

const AMOUNT: &str = "amount";
const TPL_TOKEN: &str = "tpl-token";
const REFERENCE: &str = "reference";
const LABEL: &str = "label";
const MESSAGE: &str = "message";
const MEMO: &str = "memo";

/// Encodes a payment request as a URI.
///
/// # Errors
///
/// Returns [`TrezoaPayError::InvalidLink`] if the configured scheme is not a
/// valid URI scheme or a transaction link uses a disallowed scheme.
pub fn encode_url(request: &PaymentRequest, config: &PayConfig) -> Result<Url, TrezoaPayError> {
    match request {
        PaymentRequest::Transfer(request) => encode_transfer_request_url(request, config),
        PaymentRequest::Transaction(request) => encode_transaction_request_url(request, config),
    }
}

/// Encodes a transfer request as `<scheme>:<recipient>?...`.
///
/// The amount is written as a decimal string using the token's decimals when
/// the mint is in [`PayConfig::known_tokens`], else the native decimals.
/// Empty strings are omitted.
///
/// # Errors
///
/// Returns [`TrezoaPayError::InvalidLink`] if the configured scheme is not a
/// valid URI scheme.
pub fn encode_transfer_request_url(
    request: &TransferRequest,
    config: &PayConfig,
) -> Result<Url, TrezoaPayError> {
    let base = format!("{}:{}", config.scheme, request.recipient);
    let mut url = Url::parse(&base).map_err(|e| invalid_link(&base, &e))?;

    let mut params: Vec<(&str, String)> = Vec::new();
    if let Some(amount) = request.amount {
        let decimals = config.decimals_for(request.token.as_ref());
        params.push((AMOUNT, amount.to_decimal_string(decimals)));
    }
    if let Some(token) = &request.token {
        params.push((TPL_TOKEN, token.to_string()));
    }
    params.extend(
        request
            .references
            .iter()
            .map(|reference| (REFERENCE, reference.to_string())),
    );
    push_text(&mut params, LABEL, request.label.as_deref());
    push_text(&mut params, MESSAGE, request.message.as_deref());
    push_text(&mut params, MEMO, request.memo.as_deref());

    append_query(&mut url, &params);
    Ok(url)
}

/// Encodes a transaction request.
///
/// A trailing slash before the query or at the end of the link is removed.
/// Links without a scheme are placed under the configured scheme. The result
/// must use the configured scheme or `https`.
///
/// # Errors
///
/// Returns [`TrezoaPayError::InvalidLink`] if the link cannot be parsed or
/// uses any other scheme.
pub fn encode_transaction_request_url(
    request: &TransactionRequest,
    config: &PayConfig,
) -> Result<Url, TrezoaPayError> {
    let mut link = request.link.replacen("/?", "?", 1);
    if link.ends_with('/') {
        link.pop();
    }

    let mut url = match Url::parse(&link) {
        Ok(url) if is_custom_scheme(&url, config) || url.scheme() == HTTPS_SCHEME => url,
        // `host:port/path` parses with the host as its scheme.
        Ok(url) if !url.has_host() => prefix_scheme(&link, config)?,
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => prefix_scheme(&link, config)?,
        Err(e) => return Err(invalid_link(&link, &e)),
    };

    if !is_custom_scheme(&url, config) && url.scheme() != HTTPS_SCHEME {
        return Err(TrezoaPayError::InvalidLink(format!(
            "{link:?} uses unsupported scheme {:?}",
            url.scheme()
        )));
    }

    let mut params: Vec<(&str, String)> = Vec::new();
    push_text(&mut params, LABEL, request.label.as_deref());
    push_text(&mut params, MESSAGE, request.message.as_deref());
    append_query(&mut url, &params);
    Ok(url)
}

/// Decodes a payment request URI.
///
/// `https` URIs and custom-scheme URIs whose path looks like a link
/// (contains `/`, `:` or `.`) decode to a [`TransactionRequest`]; any other
/// custom-scheme URI decodes to a [`TransferRequest`].
///
/// # Errors
///
/// - [`TrezoaPayError::InvalidLink`] if the URI does not parse or uses another scheme
/// - [`TrezoaPayError::InvalidAddress`] for a malformed recipient, token or reference
/// - [`TrezoaPayError::InvalidAmount`] for a malformed amount
pub fn decode_url(uri: &str, config: &PayConfig) -> Result<PaymentRequest, TrezoaPayError> {
    let url = Url::parse(uri).map_err(|e| invalid_link(uri, &e))?;

    let request = if url.scheme() == HTTPS_SCHEME {
        PaymentRequest::Transaction(decode_https_transaction_request(url))
    } else if is_custom_scheme(&url, config) {
        let path = urlencoding::decode(url.path())
            .map_err(|e| TrezoaPayError::InvalidLink(format!("{uri:?}: {e}")))?
            .into_owned();
        if path.contains(['/', ':', '.']) {
            PaymentRequest::Transaction(decode_custom_transaction_request(&url, path))
        } else {
            PaymentRequest::Transfer(decode_transfer_request(&url, &path, config)?)
        }
    } else {
        return Err(TrezoaPayError::InvalidLink(format!(
            "{uri:?} uses unsupported scheme {:?}",
            url.scheme()
        )));
    };

    #[cfg(feature = "telemetry")]
    tracing::debug!(uri, ?request, "decoded payment request");

    Ok(request)
}

fn decode_transfer_request(
    url: &Url,
    path: &str,
    config: &PayConfig,
) -> Result<TransferRequest, TrezoaPayError> {
    let mut request = TransferRequest::new(parse_recipient(path)?);
    let mut amount = None;

    for (key, value) in url.query_pairs() {
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            AMOUNT if amount.is_none() => amount = Some(value),
            TPL_TOKEN if request.token.is_none() => request.token = Some(parse_token(&value)?),
            REFERENCE => request.references.push(parse_reference(&value)?),
            LABEL if request.label.is_none() => request.label = Some(value.into_owned()),
            MESSAGE if request.message.is_none() => request.message = Some(value.into_owned()),
            MEMO if request.memo.is_none() => request.memo = Some(value.into_owned()),
            _ => {}
        }
    }

    // Decimals depend on the token, which may appear after the amount.
    if let Some(amount) = amount {
        let decimals = config.decimals_for(request.token.as_ref());
        request.amount = Some(parse_decimal_amount(&amount, decimals)?);
    }
    Ok(request)
}

fn decode_https_transaction_request(mut url: Url) -> TransactionRequest {
    let (label, message, rest) = split_annotations(&url);
    if rest.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&rest);
    }
    TransactionRequest {
        link: url.into(),
        label,
        message,
    }
}

fn decode_custom_transaction_request(url: &Url, path: String) -> TransactionRequest {
    let (label, message, rest) = split_annotations(url);
    let link = if rest.is_empty() {
        path
    } else {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&rest)
            .finish();
        format!("{path}?{query}")
    };
    TransactionRequest {
        link,
        label,
        message,
    }
}

/// Splits `label` and `message` out of the query, keeping other pairs in order.
fn split_annotations(url: &Url) -> (Option<String>, Option<String>, Vec<(String, String)>) {
    let mut label = None;
    let mut message = None;
    let mut rest = Vec::new();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            LABEL => {
                if label.is_none() && !value.is_empty() {
                    label = Some(value.into_owned());
                }
            }
            MESSAGE => {
                if message.is_none() && !value.is_empty() {
                    message = Some(value.into_owned());
                }
            }
            _ => rest.push((key.into_owned(), value.into_owned())),
        }
    }
    (label, message, rest)
}

fn prefix_scheme(link: &str, config: &PayConfig) -> Result<Url, TrezoaPayError> {
    let prefixed = format!("{}:{link}", config.scheme);
    Url::parse(&prefixed).map_err(|e| invalid_link(&prefixed, &e))
}

fn is_custom_scheme(url: &Url, config: &PayConfig) -> bool {
    url.scheme().eq_ignore_ascii_case(&config.scheme)
}

fn push_text<'a>(params: &mut Vec<(&'a str, String)>, key: &'a str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        params.push((key, value.to_owned()));
    }
}

fn append_query(url: &mut Url, params: &[(&str, String)]) {
    if !params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
    }
}

fn invalid_link(input: &str, error: &ParseError) -> TrezoaPayError {
    TrezoaPayError::InvalidLink(format!("{input:?}: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::{Amount, to_minor_units};
    use crate::chain::Address;
    use crate::networks::USDC;

    const RECIPIENT: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
    const R1: &str = "11111111111111111111111111111112";
    const R2: &str = "11111111111111111111111111111113";

    fn address(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn decode_transfer(uri: &str) -> TransferRequest {
        decode_transfer_with(uri, &PayConfig::default())
    }

    fn decode_transfer_with(uri: &str, config: &PayConfig) -> TransferRequest {
        match decode_url(uri, config).unwrap() {
            PaymentRequest::Transfer(request) => request,
            other => panic!("expected transfer request, got {other:?}"),
        }
    }

    fn decode_transaction(uri: &str) -> TransactionRequest {
        match decode_url(uri, &PayConfig::default()).unwrap() {
            PaymentRequest::Transaction(request) => request,
            other => panic!("expected transaction request, got {other:?}"),
        }
    }

    #[test]
    fn test_encode_native_amount() {
        let request = TransferRequest::new(address(RECIPIENT))
            .with_amount(to_minor_units(1.5, 9).unwrap());
        let url = encode_transfer_request_url(&request, &PayConfig::default()).unwrap();
        assert_eq!(url.scheme(), "trezoa");
        assert_eq!(url.path(), RECIPIENT);
        assert_eq!(url.query(), Some("amount=1.5"));
        assert_eq!(url.as_str(), format!("trezoa:{RECIPIENT}?amount=1.5"));
    }

    #[test]
    fn test_encode_recipient_only_has_no_query() {
        let request = TransferRequest::new(address(RECIPIENT));
        let url = encode_transfer_request_url(&request, &PayConfig::default()).unwrap();
        assert_eq!(url.as_str(), format!("trezoa:{RECIPIENT}"));
    }

    #[test]
    fn test_encode_parameter_order_and_empty_omission() {
        let request = TransferRequest::new(address(RECIPIENT))
            .with_amount(Amount::from_minor_units(1_500_000))
            .with_token(USDC.mint)
            .with_references([address(R1), address(R2)])
            .with_label("")
            .with_message("Thanks for all the fish")
            .with_memo("OC-1");
        let url = encode_transfer_request_url(&request, &PayConfig::default()).unwrap();
        let keys: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
        assert_eq!(
            keys,
            ["amount", "tpl-token", "reference", "reference", "message", "memo"]
        );
        let amount = url.query_pairs().next().unwrap().1.into_owned();
        assert_eq!(amount, "1.5");
    }

    #[test]
    fn test_decode_amount_and_references_in_order() {
        let request = decode_transfer(&format!(
            "trezoa:{RECIPIENT}?amount=2.5&reference={R1}&reference={R2}"
        ));
        assert_eq!(request.recipient, address(RECIPIENT));
        assert_eq!(request.amount, Some(Amount::from_minor_units(2_500_000_000)));
        assert_eq!(request.references, vec![address(R1), address(R2)]);
        assert!(request.token.is_none());
        assert_eq!(request.amount.unwrap().to_decimal_string(9), "2.5");
    }

    #[test]
    fn test_decode_preserves_reference_multiplicity() {
        let request = decode_transfer(&format!(
            "trezoa:{RECIPIENT}?reference={R2}&reference={R1}&reference={R2}"
        ));
        assert_eq!(
            request.references,
            vec![address(R2), address(R1), address(R2)]
        );
    }

    #[test]
    fn test_decode_token_amount_uses_token_decimals() {
        let request = decode_transfer(&format!(
            "trezoa:{RECIPIENT}?amount=0.01&tpl-token={}",
            USDC.mint
        ));
        assert_eq!(request.token, Some(USDC.mint));
        assert_eq!(request.amount, Some(Amount::from_minor_units(10_000)));
    }

    #[test]
    fn test_round_trip_full_transfer_request() {
        let config = PayConfig::default();
        let cases = [
            TransferRequest::new(address(RECIPIENT))
                .with_amount(Amount::from_minor_units(1))
                .with_references([address(R1), address(R2), address(R1)])
                .with_label("Michael's Shop")
                .with_message("Order #42 & co")
                .with_memo("memo/with?chars"),
            TransferRequest::new(address(RECIPIENT))
                .with_amount(Amount::from_minor_units(123_456_789))
                .with_token(USDC.mint),
            TransferRequest::new(address(RECIPIENT))
                .with_amount(Amount::from_minor_units(42))
                .with_token(address(R1)),
            TransferRequest::new(address(RECIPIENT)),
        ];
        for request in cases {
            let url = encode_transfer_request_url(&request, &config).unwrap();
            let decoded = decode_url(url.as_str(), &config).unwrap();
            assert_eq!(decoded, PaymentRequest::Transfer(request));
        }
    }

    #[test]
    fn test_eighteen_decimal_amount_round_trip() {
        let mut config = PayConfig::default();
        config.known_tokens.insert(address(R1), 18);
        let request = TransferRequest::new(address(RECIPIENT))
            .with_amount(to_minor_units(20.0, 18).unwrap())
            .with_token(address(R1));
        let url = encode_transfer_request_url(&request, &config).unwrap();
        assert_eq!(
            url.as_str(),
            format!("trezoa:{RECIPIENT}?amount=20&tpl-token={R1}")
        );

        let decoded = decode_transfer_with(
            &format!("trezoa:{RECIPIENT}?amount=18.5&tpl-token={R1}"),
            &config,
        );
        assert_eq!(
            decoded.amount,
            Some(Amount::from_minor_units(18_500_000_000_000_000_000))
        );
        assert_eq!(
            decode_url(url.as_str(), &config).unwrap(),
            PaymentRequest::Transfer(request)
        );
    }

    #[test]
    fn test_decode_rejects_bad_fields() {
        let config = PayConfig::default();
        assert!(matches!(
            decode_url("trezoa:invalid", &config),
            Err(TrezoaPayError::InvalidAddress { role: "recipient", .. })
        ));
        assert!(matches!(
            decode_url(&format!("trezoa:{RECIPIENT}?reference=bad"), &config),
            Err(TrezoaPayError::InvalidAddress { role: "reference", .. })
        ));
        assert!(matches!(
            decode_url(&format!("trezoa:{RECIPIENT}?tpl-token=bad"), &config),
            Err(TrezoaPayError::InvalidAddress { role: "token", .. })
        ));
        assert!(matches!(
            decode_url(&format!("trezoa:{RECIPIENT}?amount=-1"), &config),
            Err(TrezoaPayError::InvalidAmount(_))
        ));
        assert!(matches!(
            decode_url(&format!("trezoa:{RECIPIENT}?amount=1.0000000001"), &config),
            Err(TrezoaPayError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_decode_rejects_other_schemes() {
        let config = PayConfig::default();
        for uri in [
            format!("bitcoin:{RECIPIENT}"),
            "http://example.com/pay".to_owned(),
            "not a uri".to_owned(),
        ] {
            assert!(
                matches!(decode_url(&uri, &config), Err(TrezoaPayError::InvalidLink(_))),
                "{uri} should be rejected"
            );
        }
    }

    #[test]
    fn test_encode_transaction_request_https() {
        let request = TransactionRequest::new("https://example.com/pay/")
            .with_label("Shop")
            .with_message("Thanks");
        let url = encode_transaction_request_url(&request, &PayConfig::default()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/pay?label=Shop&message=Thanks"
        );
    }

    #[test]
    fn test_encode_transaction_request_strips_slash_before_query() {
        let request = TransactionRequest::new("https://example.com/pay/?id=7");
        let url = encode_transaction_request_url(&request, &PayConfig::default()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/pay?id=7");
    }

    #[test]
    fn test_encode_transaction_request_relative_link_gets_scheme() {
        let request = TransactionRequest::new("merchant.example/pay");
        let url = encode_transaction_request_url(&request, &PayConfig::default()).unwrap();
        assert_eq!(url.as_str(), "trezoa:merchant.example/pay");
    }

    #[test]
    fn test_encode_transaction_request_link_with_port() {
        let config = PayConfig::default();
        for link in ["localhost:3000/pay", "merchant.example:8443/pay?id=7"] {
            let request: PaymentRequest = TransactionRequest::new(link).with_label("Shop").into();
            let url = encode_url(&request, &config).unwrap();
            assert_eq!(url.scheme(), "trezoa");
            assert!(url.as_str().starts_with(&format!("trezoa:{}", link.split('?').next().unwrap())));
            let PaymentRequest::Transaction(decoded) = decode_url(url.as_str(), &config).unwrap()
            else {
                panic!("expected transaction request for {url}");
            };
            assert_eq!(decoded.link, link);
            assert_eq!(decoded.label.as_deref(), Some("Shop"));
        }
    }

    #[test]
    fn test_encode_transaction_request_rejects_other_schemes() {
        for link in ["http://example.com/pay", "ftp://example.com/pay"] {
            let request = TransactionRequest::new(link);
            assert!(matches!(
                encode_transaction_request_url(&request, &PayConfig::default()),
                Err(TrezoaPayError::InvalidLink(_))
            ));
        }
    }

    #[test]
    fn test_decode_https_transaction_request() {
        let request =
            decode_transaction("https://example.com/pay?id=7&label=Shop&message=Thanks%21");
        assert_eq!(request.link, "https://example.com/pay?id=7");
        assert_eq!(request.label.as_deref(), Some("Shop"));
        assert_eq!(request.message.as_deref(), Some("Thanks!"));
    }

    #[test]
    fn test_decode_custom_scheme_link() {
        let request = decode_transaction("trezoa:https%3A%2F%2Fexample.com%2Fpay?label=Shop");
        assert_eq!(request.link, "https://example.com/pay");
        assert_eq!(request.label.as_deref(), Some("Shop"));

        let request = decode_transaction("trezoa:merchant.example/pay");
        assert_eq!(request.link, "merchant.example/pay");
        assert!(request.label.is_none());
    }

    #[test]
    fn test_transaction_request_round_trip() {
        let config = PayConfig::default();
        let request: PaymentRequest = TransactionRequest::new("https://example.com/pay")
            .with_label("Shop")
            .with_message("Thanks")
            .into();
        let url = encode_url(&request, &config).unwrap();
        assert_eq!(decode_url(url.as_str(), &config).unwrap(), request);
    }

    #[test]
    fn test_custom_scheme_from_config() {
        let config = PayConfig {
            scheme: "pay".to_owned(),
            ..PayConfig::default()
        };
        let request: PaymentRequest = TransferRequest::new(address(RECIPIENT)).into();
        let url = encode_url(&request, &config).unwrap();
        assert_eq!(url.as_str(), format!("pay:{RECIPIENT}"));
        assert_eq!(decode_url(url.as_str(), &config).unwrap(), request);
        assert!(decode_url(url.as_str(), &PayConfig::default()).is_err());
    }
}
