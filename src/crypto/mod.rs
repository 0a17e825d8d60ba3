//! Cryptographic primitives for burnlink.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Per-secret share keys and their link-fragment encoding (`keys`)
//! - Base64 transport encoding for ciphertext and nonces (`encoding`)
//!
//! Everything here is pure: no I/O, no network, no shared state.

pub mod encoding;
pub mod encryption;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, generate_key, ...};
pub use encoding::{decode_text, encode_bytes};
pub use encryption::{decrypt, encrypt, Sealed, NONCE_LEN};
pub use keys::{export_key, generate_key, import_key, ShareKey, KEY_LEN};
