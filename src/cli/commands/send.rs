//! `burnlink send`: encrypt a secret locally, upload it, print its link.

use std::io::{self, IsTerminal, Read};

use console::style;

use crate::cli::output;
use crate::cli::{load_settings, relay_url, resolve_time_limit, resolve_view_limit, Cli, SendArgs};
use crate::client::{self, Payload, RelayClient, SendOptions};
use crate::errors::{BurnLinkError, Result};

/// Execute the `send` command.
pub fn execute(cli: &Cli, args: &SendArgs) -> Result<()> {
    let settings = load_settings(cli)?;
    let payload = read_payload(args)?;

    let relay = relay_url(cli, &settings);
    let opts = SendOptions {
        time_limit_minutes: resolve_time_limit(args, &settings),
        max_views: resolve_view_limit(args, &settings)?,
        link_base: args
            .link_base
            .clone()
            .unwrap_or_else(|| settings.link_base(&relay).to_owned()),
    };

    let client = RelayClient::new(&relay)?;
    let link = client::send(&client, &payload, &opts)?;

    output::success(&format!("Secret uploaded to {relay}"));
    output::info(&describe_limits(&opts));
    println!("{link}");
    if io::stderr().is_terminal() {
        output::tip(&format!(
            "Share the whole link, including the part after {}; the relay never sees it.",
            style("#").bold()
        ));
    }

    Ok(())
}

/// Determine the payload from one of four sources.
fn read_payload(args: &SendArgs) -> Result<Payload> {
    if let Some(path) = &args.file {
        // Source 1: A file on disk.
        return Payload::from_path(path);
    }

    let text = if let Some(text) = &args.text {
        // Source 2: Inline text on the command line.
        output::warning("Secret provided on command line; it may appear in shell history.");
        text.clone()
    } else if !io::stdin().is_terminal() {
        // Source 3: Piped input (stdin is not a terminal).
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf.trim_end_matches(['\r', '\n']).to_string()
    } else {
        // Source 4: Interactive hidden prompt (default).
        dialoguer::Password::new()
            .with_prompt("Secret to share")
            .interact()
            .map_err(|e| match e {
                dialoguer::Error::IO(io) if io.kind() == io::ErrorKind::Interrupted => {
                    BurnLinkError::UserCancelled
                }
                other => BurnLinkError::CommandFailed(format!("input prompt: {other}")),
            })?
    };

    Ok(Payload::Text(text))
}

fn describe_limits(opts: &SendOptions) -> String {
    let time = match opts.time_limit_minutes {
        Some(1) => "expires in 1 minute".to_string(),
        Some(m) => format!("expires in {m} minutes"),
        None => "no time limit".to_string(),
    };
    let views = match opts.max_views {
        Some(n) if n.get() == 1 => "burns after 1 view".to_string(),
        Some(n) => format!("burns after {n} views"),
        None => "unlimited views".to_string(),
    };
    format!("{time}, {views}")
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;

    #[test]
    fn describe_limits_reads_naturally() {
        let opts = SendOptions {
            time_limit_minutes: Some(10),
            max_views: NonZeroU32::new(1),
            link_base: String::new(),
        };
        assert_eq!(describe_limits(&opts), "expires in 10 minutes, burns after 1 view");

        let opts = SendOptions {
            time_limit_minutes: None,
            max_views: None,
            link_base: String::new(),
        };
        assert_eq!(describe_limits(&opts), "no time limit, unlimited views");
    }
}
