//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce.  The
//! nonce is *not* prepended to the ciphertext: the relay stores and
//! serves it as a separate `iv` field, next to the blob.
//!
//! The returned ciphertext already carries the 16-byte auth tag.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use super::keys::ShareKey;
use crate::errors::{BurnLinkError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Output of a single `encrypt` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext followed by the auth tag.
    pub ciphertext: Vec<u8>,
}

/// Encrypt `plaintext` under `key` with a freshly drawn nonce.
pub fn encrypt(plaintext: &[u8], key: &ShareKey) -> Result<Sealed> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| BurnLinkError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| BurnLinkError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(nonce.as_slice());

    Ok(Sealed {
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypt `ciphertext` with `key` and the `nonce` it was sealed under.
///
/// Every failure, including a nonce of the wrong length, surfaces as
/// `DecryptionFailed` so callers cannot tell a wrong key from tampering.
pub fn decrypt(ciphertext: &[u8], key: &ShareKey, nonce: &[u8]) -> Result<Vec<u8>> {
    if nonce.len() != NONCE_LEN || ciphertext.len() < TAG_LEN {
        return Err(BurnLinkError::DecryptionFailed);
    }

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| BurnLinkError::DecryptionFailed)?;

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| BurnLinkError::DecryptionFailed)
}
