//! Transport encoding for binary fields.
//!
//! Ciphertext and nonce travel as standard, padded base64 strings in the
//! relay's JSON bodies (`data` and `iv`).  The `base64` engine works on
//! slices of any length, so there is no chunking here: a 5 MiB payload
//! is encoded in one pass into a pre-sized buffer.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::errors::{BurnLinkError, Result};

/// Encode bytes for transport.
pub fn encode_bytes(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Decode a transport string back into bytes.
///
/// `field` names the JSON field in the error message.
pub fn decode_text(field: &str, text: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(text.trim())
        .map_err(|e| BurnLinkError::InvalidRequest(format!("`{field}` is not valid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_payload_round_trips_untruncated() {
        let data: Vec<u8> = (0..(5 * 1024 * 1024 + 7)).map(|i| (i % 251) as u8).collect();
        let text = encode_bytes(&data);
        assert_eq!(decode_text("data", &text).unwrap(), data);
    }

    #[test]
    fn invalid_text_names_the_field() {
        let err = decode_text("iv", "%%%").unwrap_err();
        assert!(err.to_string().contains("`iv`"));
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(encode_bytes(&[]), "");
        assert!(decode_text("data", "").unwrap().is_empty());
    }
}
