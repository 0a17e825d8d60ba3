//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::Parser;

use crate::config::Settings;
use crate::errors::{BurnLinkError, Result};
use crate::link::ShareLink;

/// burnlink CLI: zero-knowledge, self-destructing secret links.
#[derive(Parser)]
#[command(
    name = "burnlink",
    about = "Zero-knowledge, self-destructing secret links",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Relay URL (default: relay_url from burnlink.toml; `open` falls back to the link's own base)
    #[arg(long, env = "BURNLINK_RELAY", global = true)]
    pub relay: Option<String>,

    /// Directory containing burnlink.toml (default: current directory)
    #[arg(long, env = "BURNLINK_CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the relay server
    Serve {
        /// Address to bind to (default: host from burnlink.toml)
        #[arg(long, env = "BURNLINK_HOST")]
        host: Option<String>,

        /// Port to listen on (default: port from burnlink.toml)
        #[arg(short, long, env = "BURNLINK_PORT")]
        port: Option<u16>,

        /// Log filter, used when BURNLINK_LOG is not set
        #[arg(long, default_value = "info")]
        log_level: String,
    },

    /// Encrypt a secret, upload it, and print its link
    Send(SendArgs),

    /// Fetch and decrypt a secret from its link
    Open {
        /// The full link, including the `#key` part
        link: String,

        /// Write the secret to this path instead of stdout / its file name
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the output file if it exists
        #[arg(short, long)]
        force: bool,
    },

    /// Show version information
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments of `burnlink send`.
#[derive(clap::Args, Debug, Default)]
pub struct SendArgs {
    /// Secret text (omit to read stdin or prompt)
    #[arg(conflicts_with = "file")]
    pub text: Option<String>,

    /// Send a file instead of text
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Minutes until the secret expires (default: from burnlink.toml)
    #[arg(short, long, conflicts_with = "no_expiry")]
    pub expires: Option<u32>,

    /// Never expire on time; only the view limit applies
    #[arg(long)]
    pub no_expiry: bool,

    /// Number of views allowed (default: from burnlink.toml)
    #[arg(
        short,
        long,
        conflicts_with = "unlimited",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub views: Option<u32>,

    /// Allow unlimited views until expiry
    #[arg(long)]
    pub unlimited: bool,

    /// Base URL of the printed link (default: link_base or the relay URL)
    #[arg(long, env = "BURNLINK_LINK_BASE")]
    pub link_base: Option<String>,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load `burnlink.toml` from `--config-dir` or the current directory.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    Settings::load(&dir)
}

/// The relay `send` uploads to: `--relay` / `BURNLINK_RELAY`, else the
/// config file, else the built-in default.
pub fn relay_url(cli: &Cli, settings: &Settings) -> String {
    cli.relay
        .clone()
        .unwrap_or_else(|| settings.relay_url().to_owned())
}

/// The relay `open` fetches from: an explicitly configured relay, else
/// the base of the link itself.
pub fn relay_for_link(cli: &Cli, settings: &Settings, link: &ShareLink) -> String {
    cli.relay
        .clone()
        .or_else(|| settings.relay_url.clone())
        .unwrap_or_else(|| link.base().to_string())
}

/// Resolve the time limit for `send`; `None` means no time limit.
pub fn resolve_time_limit(args: &SendArgs, settings: &Settings) -> Option<u32> {
    if args.no_expiry {
        return None;
    }
    Some(args.expires.unwrap_or(settings.default_time_limit_minutes)).filter(|m| *m > 0)
}

/// Resolve the view limit for `send`; `None` means unlimited.
pub fn resolve_view_limit(args: &SendArgs, settings: &Settings) -> Result<Option<NonZeroU32>> {
    if args.unlimited {
        return Ok(None);
    }
    if let Some(views) = args.views {
        return Ok(NonZeroU32::new(views));
    }
    match settings.default_view_limit {
        -1 => Ok(None),
        n => u32::try_from(n)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Some)
            .ok_or_else(|| {
                BurnLinkError::ConfigError(format!("invalid default_view_limit {n}"))
            }),
    }
}
