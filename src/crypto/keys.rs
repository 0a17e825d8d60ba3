//! Per-secret share keys.
//!
//! A `ShareKey` is generated once per secret, used to seal it, and then
//! exported into the fragment of the share link.  The relay never sees
//! it: the fragment is stripped by every HTTP client before a request
//! goes out.

use std::fmt;

use aes_gcm::aead::{KeyInit, OsRng};
use aes_gcm::Aes256Gcm;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{BurnLinkError, Result};

/// Length of a share key (256 bits).
pub const KEY_LEN: usize = 32;

/// A 32-byte AES-256-GCM key that zeroes its memory when dropped.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct ShareKey {
    bytes: [u8; KEY_LEN],
}

impl ShareKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl PartialEq for ShareKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for ShareKey {}

impl fmt::Debug for ShareKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ShareKey(<redacted>)")
    }
}

/// Generate a fresh key from the operating system's CSPRNG.
pub fn generate_key() -> ShareKey {
    let key = Aes256Gcm::generate_key(&mut OsRng);
    let mut bytes = [0u8; KEY_LEN];
    bytes.copy_from_slice(key.as_slice());
    ShareKey::from_bytes(bytes)
}

/// Export a key as standard base64, the form carried in a link fragment.
pub fn export_key(key: &ShareKey) -> String {
    STANDARD.encode(key.as_bytes())
}

/// Import a key exported by `export_key`.
///
/// URL-safe base64 (padded or not) is accepted too, since some chat
/// clients and shorteners rewrite `+` and `/` in fragments.
pub fn import_key(text: &str) -> Result<ShareKey> {
    let text = text.trim();
    let decoded = STANDARD
        .decode(text)
        .or_else(|_| URL_SAFE.decode(text))
        .or_else(|_| URL_SAFE_NO_PAD.decode(text))
        .map(Zeroizing::new)
        .map_err(|_| BurnLinkError::InvalidKey("key is not valid base64".into()))?;

    if decoded.len() != KEY_LEN {
        return Err(BurnLinkError::InvalidKey(format!(
            "expected {KEY_LEN} key bytes, got {}",
            decoded.len()
        )));
    }

    let mut bytes = [0u8; KEY_LEN];
    bytes.copy_from_slice(&decoded);
    Ok(ShareKey::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_import_is_exact() {
        let key = generate_key();
        let restored = import_key(&export_key(&key)).unwrap();
        assert_eq!(restored, key);
    }

    #[test]
    fn exported_key_is_44_chars() {
        assert_eq!(export_key(&generate_key()).len(), 44);
    }

    #[test]
    fn import_accepts_url_safe_forms() {
        let key = ShareKey::from_bytes([0xFB; KEY_LEN]);
        let url_safe = URL_SAFE.encode(key.as_bytes());
        let no_pad = URL_SAFE_NO_PAD.encode(key.as_bytes());
        assert_eq!(import_key(&url_safe).unwrap(), key);
        assert_eq!(import_key(&no_pad).unwrap(), key);
    }

    #[test]
    fn import_rejects_wrong_length() {
        let short = STANDARD.encode([1u8; 16]);
        assert!(matches!(
            import_key(&short),
            Err(BurnLinkError::InvalidKey(_))
        ));
    }

    #[test]
    fn import_rejects_garbage() {
        assert!(import_key("not a key!!").is_err());
        assert!(import_key("").is_err());
    }

    #[test]
    fn debug_does_not_leak_bytes() {
        let key = ShareKey::from_bytes([0xAB; KEY_LEN]);
        assert_eq!(format!("{key:?}"), "ShareKey(<redacted>)");
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(generate_key(), generate_key());
    }
}
