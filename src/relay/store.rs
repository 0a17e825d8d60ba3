//! The ephemeral secret store.
//!
//! `SecretStore` owns every secret the relay holds.  It is an explicit,
//! cheaply clonable handle (an `Arc` inside) created once at startup and
//! injected into the HTTP handlers and the sweep task.
//!
//! The id -> entry map is split into shards, each behind its own
//! `parking_lot::Mutex`.  Every operation on one id locks exactly one
//! shard and does O(1) work under it, so the check-increment-delete
//! sequence in `fetch` is a single critical section: two readers racing
//! for the last view of a secret are strictly ordered, and only one of
//! them gets the payload.

use std::collections::hash_map::{Entry, HashMap, RandomState};
use std::hash::BuildHasher;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::secret::{
    BurnMarker, NewSecret, PayloadKind, SecretId, SecretRecord, SecretSnapshot,
};
use crate::errors::{BurnLinkError, Result};

/// Number of independently locked shards.
const SHARD_COUNT: usize = 16;

/// How many fresh ids `create` draws before giving up on a collision streak.
const MAX_ID_ATTEMPTS: usize = 8;

/// Default lifetime of a burn marker for secrets without a time limit.
pub const DEFAULT_BURN_MARKER_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// One map slot: either a live secret or what is left after it burned.
#[derive(Debug)]
enum Slot {
    Live(SecretRecord),
    Burned(BurnMarker),
}

impl Slot {
    /// Whether the sweep may drop this slot.
    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self {
            Slot::Live(record) => record.is_expired(now),
            Slot::Burned(marker) => marker.is_stale(now),
        }
    }
}

/// Outcome of inspecting a slot, decided while it is borrowed.
enum Visit {
    Serve(SecretSnapshot),
    LastView(Option<DateTime<Utc>>),
    Expired,
    Exhausted(Option<DateTime<Utc>>),
    Gone,
    StillBurned,
}

/// Counts reported by `SecretStore::stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Secrets that can still be fetched (or are expired but not yet swept).
    pub live: usize,
    /// Burn markers still being retained.
    pub burned: usize,
}

struct Inner {
    shards: Vec<Mutex<HashMap<SecretId, Slot>>>,
    hasher: RandomState,
    burn_marker_ttl: TimeDelta,
}

/// Thread-safe handle to the in-memory secret map.
#[derive(Clone)]
pub struct SecretStore {
    inner: Arc<Inner>,
}

impl Default for SecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore {
    /// Create an empty store with the default burn-marker lifetime.
    pub fn new() -> Self {
        Self::with_burn_marker_ttl(DEFAULT_BURN_MARKER_TTL)
    }

    /// Create an empty store whose burn markers (for secrets without a
    /// time limit) are kept for `ttl`.
    pub fn with_burn_marker_ttl(ttl: Duration) -> Self {
        let burn_marker_ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        let shards = (0..SHARD_COUNT)
            .map(|_| Mutex::new(HashMap::new()))
            .collect();
        Self {
            inner: Arc::new(Inner {
                shards,
                hasher: RandomState::new(),
                burn_marker_ttl,
            }),
        }
    }

    fn shard(&self, id: &str) -> &Mutex<HashMap<SecretId, Slot>> {
        let index = (self.inner.hasher.hash_one(id) as usize) % SHARD_COUNT;
        &self.inner.shards[index]
    }

    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Store a new secret and return its id.
    pub fn create(&self, secret: NewSecret) -> Result<SecretId> {
        self.create_at(secret, Utc::now())
    }

    /// `create` with an explicit clock reading.
    pub fn create_at(&self, secret: NewSecret, now: DateTime<Utc>) -> Result<SecretId> {
        let expires_at = match secret.time_limit {
            Some(limit) => Some(now.checked_add_signed(limit).ok_or_else(|| {
                BurnLinkError::InvalidRequest("time limit is out of range".into())
            })?),
            None => None,
        };

        let kind = match secret.payload {
            PayloadKind::Text => "text",
            PayloadKind::File { .. } => "file",
        };

        let record = SecretRecord {
            ciphertext: secret.ciphertext.into(),
            nonce: secret.nonce,
            created_at: now,
            expires_at,
            max_views: secret.max_views,
            current_views: 0,
            payload: secret.payload,
        };

        for _ in 0..MAX_ID_ATTEMPTS {
            let id = SecretId::generate();
            let mut shard = self.shard(id.as_str()).lock();
            match shard.entry(id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(Slot::Live(record));
                    info!(
                        id = %id,
                        kind,
                        expires_at = ?expires_at,
                        max_views = ?secret.max_views,
                        "secret created"
                    );
                    return Ok(id);
                }
                Entry::Occupied(_) => {
                    warn!("secret id collision, regenerating");
                }
            }
        }

        Err(BurnLinkError::IdExhausted(MAX_ID_ATTEMPTS))
    }

    // ------------------------------------------------------------------
    // Fetch
    // ------------------------------------------------------------------

    /// Serve one view of a secret.
    ///
    /// Fails with `NotFound`, `Expired` or `Burned`.  The view that uses
    /// up the quota deletes the payload in the same locked step that
    /// serves it.
    pub fn fetch(&self, id: &str) -> Result<SecretSnapshot> {
        self.fetch_at(id, Utc::now())
    }

    /// `fetch` with an explicit clock reading.
    pub fn fetch_at(&self, id: &str, now: DateTime<Utc>) -> Result<SecretSnapshot> {
        let mut shard = self.shard(id).lock();

        let visit = match shard.get_mut(id) {
            None => return Err(BurnLinkError::NotFound),
            Some(Slot::Burned(marker)) => {
                if marker.is_expired(now) {
                    Visit::Expired
                } else if marker.is_stale(now) {
                    Visit::Gone
                } else {
                    Visit::StillBurned
                }
            }
            Some(Slot::Live(record)) => {
                if record.is_expired(now) {
                    Visit::Expired
                } else if record.views_exhausted() {
                    // A record at its limit should already be a marker.
                    Visit::Exhausted(record.expires_at)
                } else {
                    record.current_views += 1;
                    if record.views_exhausted() {
                        Visit::LastView(record.expires_at)
                    } else {
                        Visit::Serve(record.snapshot(id))
                    }
                }
            }
        };

        match visit {
            Visit::Serve(snapshot) => {
                debug!(id, views = snapshot.current_views, "secret served");
                Ok(snapshot)
            }
            Visit::LastView(expires_at) => {
                let marker = Slot::Burned(self.burn_marker(expires_at, now));
                match shard
                    .get_mut(id)
                    .map(|slot| std::mem::replace(slot, marker))
                {
                    Some(Slot::Live(record)) => {
                        let snapshot = record.into_snapshot(id);
                        info!(id, views = snapshot.current_views, "secret burned");
                        Ok(snapshot)
                    }
                    _ => Err(BurnLinkError::NotFound),
                }
            }
            Visit::Expired => {
                shard.remove(id);
                info!(id, "secret expired on fetch");
                Err(BurnLinkError::Expired)
            }
            Visit::Exhausted(expires_at) => {
                if let Some(slot) = shard.get_mut(id) {
                    *slot = Slot::Burned(self.burn_marker(expires_at, now));
                }
                warn!(id, "secret found past its view limit");
                Err(BurnLinkError::Burned)
            }
            Visit::Gone => {
                shard.remove(id);
                Err(BurnLinkError::NotFound)
            }
            Visit::StillBurned => Err(BurnLinkError::Burned),
        }
    }

    fn burn_marker(&self, expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> BurnMarker {
        BurnMarker::new(expires_at, now, self.inner.burn_marker_ttl)
    }

    // ------------------------------------------------------------------
    // Sweep
    // ------------------------------------------------------------------

    /// Drop every expired secret and every retired burn marker.
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    /// `sweep` with an explicit clock reading.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        for shard in &self.inner.shards {
            let mut shard = shard.lock();
            let before = shard.len();
            shard.retain(|_, slot| !slot.is_stale(now));
            removed += before - shard.len();
        }
        if removed > 0 {
            info!(removed, "swept expired secrets");
        }
        removed
    }

    /// Spawn a background Tokio task that calls `sweep()` every `interval`.
    pub fn spawn_sweep(self, interval: Duration) -> JoinHandle<()> {
        let interval = interval.max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await; // skip first immediate tick
            loop {
                ticker.tick().await;
                self.sweep();
            }
        })
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Count live secrets and burn markers.
    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats::default();
        for shard in &self.inner.shards {
            for slot in shard.lock().values() {
                match slot {
                    Slot::Live(_) => stats.live += 1,
                    Slot::Burned(_) => stats.burned += 1,
                }
            }
        }
        stats
    }
}
