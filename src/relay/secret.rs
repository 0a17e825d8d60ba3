//! Secret records held by the relay, and the snapshots it hands out.
//!
//! A record only ever holds what the relay is allowed to see: sealed
//! bytes, the nonce, limits and counters, and opaque file metadata.
//! There is no field a key could be put into.

use std::borrow::Borrow;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeDelta, Utc};
use rand::RngCore;

use crate::crypto::NONCE_LEN;

/// Random bytes behind every secret id (128 bits).
const ID_BYTES: usize = 16;

/// Opaque, unguessable identifier; the only part of a link the relay sees.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretId(String);

impl SecretId {
    /// Draw a fresh id from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; ID_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SecretId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<SecretId> for String {
    fn from(id: SecretId) -> Self {
        id.0
    }
}

/// What kind of payload was sealed.
///
/// File metadata is carried verbatim; the relay never interprets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PayloadKind {
    #[default]
    Text,
    File {
        file_name: Option<String>,
        mime_type: Option<String>,
    },
}

/// Everything `SecretStore::create` needs to store a new secret.
#[derive(Debug, Clone)]
pub struct NewSecret {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
    /// `None` means no time limit.
    pub time_limit: Option<TimeDelta>,
    /// `None` means unlimited views.
    pub max_views: Option<NonZeroU32>,
    pub payload: PayloadKind,
}

/// A live secret inside the store.
#[derive(Debug)]
pub(crate) struct SecretRecord {
    /// Shared so a non-final view only bumps a refcount under the shard lock.
    pub ciphertext: Arc<[u8]>,
    pub nonce: [u8; NONCE_LEN],
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_views: Option<NonZeroU32>,
    pub current_views: u32,
    pub payload: PayloadKind,
}

impl SecretRecord {
    /// True once the time limit has been reached.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    /// True once the view quota is used up.
    pub fn views_exhausted(&self) -> bool {
        self.max_views
            .is_some_and(|max| self.current_views >= max.get())
    }

    /// The servable state, leaving the record in place.
    pub fn snapshot(&self, id: &str) -> SecretSnapshot {
        SecretSnapshot {
            id: id.to_owned(),
            ciphertext: Arc::clone(&self.ciphertext),
            nonce: self.nonce,
            created_at: self.created_at,
            expires_at: self.expires_at,
            max_views: self.max_views,
            current_views: self.current_views,
            payload: self.payload.clone(),
        }
    }

    /// Move the servable state out; used for the final, burning read.
    pub fn into_snapshot(self, id: &str) -> SecretSnapshot {
        SecretSnapshot {
            id: id.to_owned(),
            ciphertext: self.ciphertext,
            nonce: self.nonce,
            created_at: self.created_at,
            expires_at: self.expires_at,
            max_views: self.max_views,
            current_views: self.current_views,
            payload: self.payload,
        }
    }
}

/// Left behind when a secret burns: no payload, just enough to answer
/// `Burned` instead of `NotFound` until `retain_until`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BurnMarker {
    pub expires_at: Option<DateTime<Utc>>,
    pub retain_until: DateTime<Utc>,
}

impl BurnMarker {
    pub fn new(
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        ttl: TimeDelta,
    ) -> Self {
        let retain_until = expires_at
            .or_else(|| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            expires_at,
            retain_until,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now >= self.retain_until
    }
}

/// The state of a secret as served by one successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretSnapshot {
    pub id: String,
    pub ciphertext: Arc<[u8]>,
    pub nonce: [u8; NONCE_LEN],
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_views: Option<NonZeroU32>,
    /// Views including the one that produced this snapshot.
    pub current_views: u32,
    pub payload: PayloadKind,
}

impl SecretSnapshot {
    /// True when this snapshot was the last view the secret allowed.
    pub fn was_final_view(&self) -> bool {
        self.max_views
            .is_some_and(|max| self.current_views >= max.get())
    }
}
