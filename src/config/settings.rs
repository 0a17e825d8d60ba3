use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{BurnLinkError, Result};

/// Relay used by `send` when neither the command line nor the config
/// file names one.
pub const DEFAULT_RELAY_URL: &str = "http://localhost:3001";

/// Configuration for both the relay and the client, loaded from
/// `burnlink.toml`.
///
/// Every field has a sensible default so burnlink works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Address the relay binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the relay listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds between eviction sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Largest request body the relay accepts, in bytes (default: 16 MiB).
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// How long a burn marker for a secret without a time limit is kept.
    #[serde(default = "default_burn_marker_ttl_secs")]
    pub burn_marker_ttl_secs: u64,

    /// Relay the client talks to.  When unset, `send` uses
    /// [`DEFAULT_RELAY_URL`] and `open` uses the base of the link.
    #[serde(default)]
    pub relay_url: Option<String>,

    /// Base of the links `send` prints; defaults to the relay URL.
    #[serde(default)]
    pub link_base: Option<String>,

    /// Time limit applied by `send` when none is given (0 = none).
    #[serde(default = "default_time_limit_minutes")]
    pub default_time_limit_minutes: u32,

    /// View limit applied by `send` when none is given (-1 = unlimited).
    #[serde(default = "default_view_limit")]
    pub default_view_limit: i64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_burn_marker_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_time_limit_minutes() -> u32 {
    10
}

fn default_view_limit() -> i64 {
    1
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            sweep_interval_secs: default_sweep_interval_secs(),
            max_body_bytes: default_max_body_bytes(),
            burn_marker_ttl_secs: default_burn_marker_ttl_secs(),
            relay_url: None,
            link_base: None,
            default_time_limit_minutes: default_time_limit_minutes(),
            default_view_limit: default_view_limit(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the config directory.
    pub const FILE_NAME: &'static str = "burnlink.toml";

    /// Load settings from `<config_dir>/burnlink.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed or holds out-of-range
    /// values, an error is returned.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            BurnLinkError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the relay or client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval_secs == 0 {
            return Err(BurnLinkError::ConfigError(
                "sweep_interval_secs must be at least 1".into(),
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(BurnLinkError::ConfigError(
                "max_body_bytes must be greater than 0".into(),
            ));
        }
        if self.default_view_limit == 0 || self.default_view_limit < -1 {
            return Err(BurnLinkError::ConfigError(
                "default_view_limit must be -1 or a positive integer".into(),
            ));
        }
        Ok(())
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn burn_marker_ttl(&self) -> Duration {
        Duration::from_secs(self.burn_marker_ttl_secs)
    }

    /// The configured relay, or [`DEFAULT_RELAY_URL`].
    pub fn relay_url(&self) -> &str {
        self.relay_url.as_deref().unwrap_or(DEFAULT_RELAY_URL)
    }

    /// Base URL for share links: `link_base` if set, else `relay`.
    pub fn link_base<'a>(&'a self, relay: &'a str) -> &'a str {
        self.link_base.as_deref().unwrap_or(relay)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.host, "0.0.0.0");
        assert_eq!(s.port, 3001);
        assert_eq!(s.sweep_interval(), Duration::from_secs(60));
        assert_eq!(s.max_body_bytes, 16 * 1024 * 1024);
        assert_eq!(s.default_time_limit_minutes, 10);
        assert_eq!(s.default_view_limit, 1);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
host = "127.0.0.1"
port = 8088
sweep_interval_secs = 5
relay_url = "https://relay.example.com"
link_base = "https://share.example.com/s"
default_time_limit_minutes = 0
default_view_limit = -1
"#;
        fs::write(tmp.path().join("burnlink.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, 8088);
        assert_eq!(settings.sweep_interval(), Duration::from_secs(5));
        assert_eq!(settings.relay_url(), "https://relay.example.com");
        assert_eq!(
            settings.link_base(settings.relay_url()),
            "https://share.example.com/s"
        );
        assert_eq!(settings.default_time_limit_minutes, 0);
        assert_eq!(settings.default_view_limit, -1);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("burnlink.toml"), "port = 9000\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.port, 9000);
        // Rest should be defaults
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.relay_url, None);
        assert_eq!(settings.relay_url(), DEFAULT_RELAY_URL);
        assert_eq!(settings.link_base("http://relay:1"), "http://relay:1");
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("burnlink.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(BurnLinkError::ConfigError(_))));
    }

    #[test]
    fn load_rejects_zero_sweep_interval() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("burnlink.toml"), "sweep_interval_secs = 0\n").unwrap();

        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn validate_rejects_zero_view_limit() {
        let s = Settings {
            default_view_limit: 0,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }
}
