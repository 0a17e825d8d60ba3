//! Relay module: the server-side ephemeral secret store.
//!
//! This module provides:
//! - Secret records, burn markers and snapshots (`secret`)
//! - The sharded, race-free `SecretStore` with its eviction sweep (`store`)
//! - JSON request/response bodies shared with clients (`wire`)

pub mod secret;
pub mod store;
pub mod wire;

// Re-export the most commonly used items.
pub use secret::{NewSecret, PayloadKind, SecretId, SecretSnapshot};
pub use store::{SecretStore, StoreStats, DEFAULT_BURN_MARKER_TTL};
pub use wire::{CreateSecretRequest, CreateSecretResponse, FetchSecretResponse, WireKind};
