//! `burnlink version`: display version and relay status.

use console::style;

use crate::cli::Cli;
use crate::client::RelayClient;
use crate::errors::Result;

/// Execute the `version` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let current = env!("CARGO_PKG_VERSION");
    println!("burnlink {current}");

    // Only check a relay the user named explicitly; never fails.
    if let Some(relay) = &cli.relay {
        match RelayClient::new(relay).and_then(|c| c.health()) {
            Ok(health) => println!(
                "relay {} {} ({} live, {} burned)",
                style(relay).cyan(),
                style(&health.status).green().bold(),
                health.secrets,
                health.burned
            ),
            Err(e) => println!("relay {} {}", style(relay).cyan(), style(e).red()),
        }
    }

    Ok(())
}
