//! Shareable URL fragment codec.
//!
//! A session-description blob folded into a link fragment
//! (`#receive=<base64>`), so opening the link on the receiving side starts
//! the exchange with no typing. The fragment never leaves the URL bar in a
//! browser context, which is why the blob rides in the fragment rather than
//! the query string.

use crate::error::SignalingError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Fragment prefix marking a receive link.
pub const RECEIVE_PREFIX: &str = "#receive=";

/// Encode a blob as a `#receive=` URL fragment.
#[must_use]
pub fn encode_share_fragment(blob: &str) -> String {
    format!("{RECEIVE_PREFIX}{}", STANDARD.encode(blob))
}

/// Decode a `#receive=` URL fragment back into the blob.
pub fn decode_share_fragment(fragment: &str) -> Result<String, SignalingError> {
    let encoded = fragment
        .strip_prefix(RECEIVE_PREFIX)
        .ok_or_else(|| SignalingError::InvalidFragment("missing #receive= prefix".into()))?;
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| SignalingError::InvalidFragment(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SignalingError::InvalidFragment(e.to_string()))
}
