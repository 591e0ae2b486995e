//! Reversible text encoding of a deal for sharable links.
//!
//! The token is the flat key-value JSON form of [`DealInputs`] (decimals as
//! strings, so nothing is lost) in URL-safe base64 without padding. Links
//! carry it in an `s` query or fragment parameter.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;

use crate::error::CalcError;
use crate::inputs::DealInputs;
use crate::CalcResult;

/// Query/fragment parameter that carries the token.
pub const SHARE_PARAM: &str = "s";

/// Encode a deal as a URL-safe token.
pub fn encode_share_link(inputs: &DealInputs) -> CalcResult<String> {
    let json = serde_json::to_vec(inputs)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode a token produced by [`encode_share_link`].
///
/// The token must be valid base64 holding a JSON object. Individual fields
/// that are missing or malformed fall back to the defaults.
pub fn decode_share_link(token: &str) -> CalcResult<DealInputs> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token.trim().trim_end_matches('='))
        .map_err(|e| CalcError::ShareLink(format!("invalid base64: {e}")))?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| CalcError::ShareLink(format!("invalid payload: {e}")))?;
    if !value.is_object() {
        return Err(CalcError::ShareLink("payload is not an object".into()));
    }
    Ok(DealInputs::from_value_lenient(&value, &DealInputs::default()))
}

/// Decode a token, keeping `prior` if it cannot be read.
pub fn decode_share_link_or(token: &str, prior: &DealInputs) -> DealInputs {
    match decode_share_link(token) {
        Ok(inputs) => inputs,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable share link");
            prior.clone()
        }
    }
}

/// Append the encoded deal to `base_url` as `?s=<token>`.
pub fn share_url(base_url: &str, inputs: &DealInputs) -> CalcResult<String> {
    let token = encode_share_link(inputs)?;
    let base = base_url.split(['?', '#']).next().unwrap_or(base_url);
    Ok(format!("{base}?{SHARE_PARAM}={token}"))
}

/// Pull the share token out of a URL's query string or fragment.
pub fn token_from_url(url: &str) -> Option<&str> {
    let params = url.split_once(['?', '#']).map(|(_, rest)| rest)?;
    params
        .split(['&', '?', '#'])
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == SHARE_PARAM)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Restore a deal from a shared URL, keeping `prior` when the URL has no
/// token or the token is unreadable.
pub fn inputs_from_url(url: &str, prior: &DealInputs) -> DealInputs {
    match token_from_url(url) {
        Some(token) => decode_share_link_or(token, prior),
        None => prior.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_trip() {
        let mut inputs = DealInputs::default();
        inputs.price = dec!(2_345_678.91);
        inputs.interest_rate = dec!(6.875);
        inputs.balloon = dec!(400_000);
        inputs.holdback_release_months = 18;

        let token = encode_share_link(&inputs).unwrap();
        assert!(!token.contains(['+', '/', '=']));
        assert_eq!(decode_share_link(&token).unwrap(), inputs);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_share_link("%%%not-base64%%%"),
            Err(CalcError::ShareLink(_))
        ));
        let not_object = URL_SAFE_NO_PAD.encode("[1,2,3]");
        assert!(decode_share_link(&not_object).is_err());
    }

    #[test]
    fn test_decode_or_keeps_prior() {
        let mut prior = DealInputs::default();
        prior.price = dec!(123);
        assert_eq!(decode_share_link_or("!!", &prior), prior);
    }

    #[test]
    fn test_share_url_round_trip() {
        let inputs = DealInputs::default();
        let url = share_url("https://calc.example.com/deal?old=1#top", &inputs).unwrap();
        assert!(url.starts_with("https://calc.example.com/deal?s="));
        assert_eq!(inputs_from_url(&url, &DealInputs::default()), inputs);
    }

    #[test]
    fn test_token_from_fragment() {
        assert_eq!(token_from_url("https://x.test/#a=1&s=abc"), Some("abc"));
        assert_eq!(token_from_url("https://x.test/?s="), None);
        assert_eq!(token_from_url("https://x.test/"), None);
    }
}
