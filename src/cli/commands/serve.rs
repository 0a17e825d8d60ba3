//! `burnlink serve`: run the relay server.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::{load_settings, Cli};
use crate::errors::{BurnLinkError, Result};
use crate::server::{self, ServerConfig};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "BURNLINK_LOG";

/// Execute the `serve` command.
pub fn execute(cli: &Cli, host: Option<&str>, port: Option<u16>, log_level: &str) -> Result<()> {
    init_tracing(log_level)?;

    let settings = load_settings(cli)?;
    let mut cfg = ServerConfig::from_settings(&settings);
    if let Some(host) = host {
        cfg.host = host.to_string();
    }
    if let Some(port) = port {
        cfg.port = port;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::run(cfg))
}

/// Structured logs to stderr; `BURNLINK_LOG` wins over `--log-level`.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level).map_err(|e| {
            BurnLinkError::ConfigError(format!("invalid log level '{log_level}': {e}"))
        })?,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .map_err(|e| BurnLinkError::CommandFailed(format!("logging setup: {e}")))
}
