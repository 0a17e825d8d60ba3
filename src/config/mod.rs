//! Configuration loaded from `burnlink.toml`.

pub mod settings;

pub use settings::{Settings, DEFAULT_RELAY_URL};
