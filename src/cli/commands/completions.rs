//! `burnlink completions <shell>`: print a completion script on stdout.
//!
//!   burnlink completions bash > ~/.local/share/bash-completion/completions/burnlink
//!   burnlink completions zsh > "${fpath[1]}/_burnlink"

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write_script(shell, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Render the script for `shell` into `out`.
fn write_script(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_owned();
    generate(shell, &mut cmd, bin, out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(shell: Shell) -> String {
        let mut buf = Vec::new();
        write_script(shell, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn scripts_cover_every_subcommand() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
            let text = script(shell);
            for sub in ["serve", "send", "open", "version", "completions"] {
                assert!(text.contains(sub), "{shell}: missing {sub}");
            }
        }
    }

    #[test]
    fn scripts_complete_global_relay_flag() {
        assert!(script(Shell::Bash).contains("--relay"));
        assert!(script(Shell::Fish).contains("relay"));
    }
}
