//! The sender and recipient halves of the protocol.
//!
//! `send`: generate a key, seal the payload locally, upload only the
//! ciphertext, and build the link.  `open`: fetch by id, decrypt locally
//! with the key from the link fragment.

use std::borrow::Cow;
use std::num::NonZeroU32;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::debug;
use zeroize::Zeroizing;

use super::RelayClient;
use crate::crypto::{decode_text, decrypt, encrypt, generate_key, NONCE_LEN};
use crate::errors::{BurnLinkError, Result};
use crate::link::ShareLink;
use crate::relay::wire::CreateSecretRequest;
use crate::relay::PayloadKind;

/// Largest plaintext `send` accepts (5 MiB).
pub const MAX_PAYLOAD_BYTES: usize = 5 * 1024 * 1024;

/// What a sender wants to share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    File {
        name: String,
        mime_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl Payload {
    /// Read a file from disk, guessing its MIME type from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let size = std::fs::metadata(path)?.len();
        if size > MAX_PAYLOAD_BYTES as u64 {
            return Err(too_large(size));
        }

        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "secret.bin".to_string());
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string());

        Ok(Payload::File {
            name,
            mime_type,
            bytes,
        })
    }

    fn bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::File { bytes, .. } => bytes,
        }
    }

    fn kind(&self) -> PayloadKind {
        match self {
            Payload::Text(_) => PayloadKind::Text,
            Payload::File {
                name, mime_type, ..
            } => PayloadKind::File {
                file_name: Some(name.clone()),
                mime_type: mime_type.clone(),
            },
        }
    }
}

/// Limits and link settings for `send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOptions {
    /// `None` means no time limit.
    pub time_limit_minutes: Option<u32>,
    /// `None` means unlimited views.
    pub max_views: Option<NonZeroU32>,
    /// Base of the printed link.
    pub link_base: String,
}

/// Seal `payload`, upload it, and return the share link.
pub fn send(client: &RelayClient, payload: &Payload, opts: &SendOptions) -> Result<ShareLink> {
    let plaintext = payload.bytes();
    if plaintext.is_empty() {
        return Err(BurnLinkError::InvalidRequest("nothing to send".into()));
    }
    if plaintext.len() > MAX_PAYLOAD_BYTES {
        return Err(too_large(plaintext.len() as u64));
    }

    let key = generate_key();
    let sealed = encrypt(plaintext, &key)?;
    let request = CreateSecretRequest::from_sealed(
        &sealed,
        opts.time_limit_minutes.filter(|m| *m > 0),
        opts.max_views,
        &payload.kind(),
    );

    let id = client.create(&request)?;
    debug!(id = %id, bytes = plaintext.len(), "secret uploaded");
    ShareLink::new(&opts.link_base, &id, key)
}

/// A secret fetched and decrypted by `open`.
#[derive(Debug)]
pub struct OpenedSecret {
    pub content: Zeroizing<Vec<u8>>,
    pub kind: PayloadKind,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_views: Option<u32>,
    pub current_views: u32,
}

impl OpenedSecret {
    /// The content as text; `None` for file payloads.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self.kind {
            PayloadKind::Text => Some(String::from_utf8_lossy(&self.content)),
            PayloadKind::File { .. } => None,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        match &self.kind {
            PayloadKind::File { file_name, .. } => file_name.as_deref(),
            PayloadKind::Text => None,
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        match &self.kind {
            PayloadKind::File { mime_type, .. } => mime_type.as_deref(),
            PayloadKind::Text => None,
        }
    }

    /// Views left after this one; `None` when unlimited.
    pub fn remaining_views(&self) -> Option<u32> {
        self.max_views
            .map(|max| max.saturating_sub(self.current_views))
    }

    /// True when this was the last view and the secret is now gone.
    pub fn was_final_view(&self) -> bool {
        self.remaining_views() == Some(0)
    }
}

/// Fetch the secret behind `link` and decrypt it locally.
///
/// Consumes one view whether or not decryption succeeds.
pub fn open(client: &RelayClient, link: &ShareLink) -> Result<OpenedSecret> {
    let response = client.fetch(link.id())?;

    // A relay that returns garbage is indistinguishable from tampering.
    let ciphertext = decode_text("data", &response.data)
        .map_err(|_| BurnLinkError::DecryptionFailed)?;
    let nonce = decode_text("iv", &response.iv)
        .map_err(|_| BurnLinkError::DecryptionFailed)?;
    if nonce.len() != NONCE_LEN {
        return Err(BurnLinkError::DecryptionFailed);
    }

    let content = Zeroizing::new(decrypt(&ciphertext, link.key(), &nonce)?);
    debug!(id = link.id(), views = response.current_views, "secret opened");

    Ok(OpenedSecret {
        content,
        kind: response.payload_kind(),
        created_at: response.created_at(),
        expires_at: response.expires_at(),
        max_views: response.max_views,
        current_views: response.current_views,
    })
}

fn too_large(size: u64) -> BurnLinkError {
    BurnLinkError::PayloadTooLarge(format!(
        "{size} bytes exceeds the {} MiB limit",
        MAX_PAYLOAD_BYTES / (1024 * 1024)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn from_path_reads_name_and_mime() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        fs::write(&path, "secret notes").unwrap();

        let payload = Payload::from_path(&path).unwrap();
        assert_eq!(
            payload,
            Payload::File {
                name: "notes.txt".into(),
                mime_type: Some("text/plain".into()),
                bytes: b"secret notes".to_vec(),
            }
        );
    }

    #[test]
    fn from_path_rejects_oversized_files() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("big.bin");
        let file = fs::File::create(&path).unwrap();
        file.set_len(MAX_PAYLOAD_BYTES as u64 + 1).unwrap();

        assert!(matches!(
            Payload::from_path(&path),
            Err(BurnLinkError::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn send_rejects_empty_and_oversized_before_any_request() {
        // Nothing listens here; a request would fail with `Relay`.
        let client = RelayClient::new("http://127.0.0.1:9").unwrap();
        let opts = SendOptions {
            time_limit_minutes: Some(10),
            max_views: NonZeroU32::new(1),
            link_base: "http://127.0.0.1:9".into(),
        };

        assert!(matches!(
            send(&client, &Payload::Text(String::new()), &opts),
            Err(BurnLinkError::InvalidRequest(_))
        ));

        let big = Payload::File {
            name: "big.bin".into(),
            mime_type: None,
            bytes: vec![0u8; MAX_PAYLOAD_BYTES + 1],
        };
        assert!(matches!(
            send(&client, &big, &opts),
            Err(BurnLinkError::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn remaining_views_counts_down() {
        let opened = OpenedSecret {
            content: Zeroizing::new(b"hi".to_vec()),
            kind: PayloadKind::Text,
            created_at: None,
            expires_at: None,
            max_views: Some(3),
            current_views: 3,
        };
        assert_eq!(opened.remaining_views(), Some(0));
        assert!(opened.was_final_view());
        assert_eq!(opened.text().as_deref(), Some("hi"));
        assert_eq!(opened.file_name(), None);
    }
}
