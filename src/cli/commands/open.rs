//! `burnlink open`: fetch a secret by its link and decrypt it locally.
//!
//! Opening consumes a view, so every check that can fail without the
//! relay (link syntax, key, an explicit `--output` that already exists)
//! runs before the fetch.

use std::fs::{self, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use crate::cli::output;
use crate::cli::{load_settings, relay_for_link, Cli};
use crate::client::{self, OpenedSecret, RelayClient};
use crate::errors::{BurnLinkError, Result};
use crate::link::ShareLink;

/// Used when a file secret carries no usable name.
const FALLBACK_FILE_NAME: &str = "burnlink-secret.bin";

/// Execute the `open` command.
pub fn execute(cli: &Cli, link: &str, output_path: Option<&Path>, force: bool) -> Result<()> {
    let link = ShareLink::parse(link)?;

    if let Some(path) = output_path {
        if path.exists() && !force {
            return Err(BurnLinkError::CommandFailed(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
    }

    let settings = load_settings(cli)?;
    let client = RelayClient::new(&relay_for_link(cli, &settings, &link))?;

    let opened = match client::open(&client, &link) {
        Ok(opened) => opened,
        Err(e) => {
            explain_failure(&e);
            return Err(e);
        }
    };

    output::print_secret_details(&opened);

    match (output_path, opened.text()) {
        (None, Some(text)) => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            if io::stdout().is_terminal() && !text.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            stdout.flush()?;
        }
        (Some(path), _) => {
            write_secret(path, &opened, force)?;
            output::success(&format!("Secret written to {}", path.display()));
        }
        (None, None) => {
            let name = opened
                .file_name()
                .and_then(safe_file_name)
                .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());
            let path = if force {
                PathBuf::from(&name)
            } else {
                free_path(&name)
            };
            write_secret(&path, &opened, force)?;
            output::success(&format!("File saved as {}", path.display()));
        }
    }

    if opened.was_final_view() {
        output::info("That was the last view; the secret is now destroyed.");
    }

    Ok(())
}

/// Add a hint for the outcomes that mean the secret is gone for good.
fn explain_failure(err: &BurnLinkError) {
    match err {
        BurnLinkError::DecryptionFailed => {
            output::tip("Check that the link was copied completely, including the part after #.");
        }
        e if e.is_terminal() => {
            output::tip("Secrets burn after use. Ask the sender for a new link.");
        }
        _ => {}
    }
}

/// Write without clobbering unless `force` is set.
fn write_secret(path: &Path, secret: &OpenedSecret, force: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options.open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            BurnLinkError::CommandFailed(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            ))
        } else {
            BurnLinkError::Io(e)
        }
    })?;
    file.write_all(&secret.content)?;
    file.flush()?;
    Ok(())
}

/// Reduce a sender-supplied name to a plain file name in the current
/// directory: no directories, no traversal, no control characters.
fn safe_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next()?;
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// `name`, or `name-1`, `name-2`, ... (before the extension) if taken.
fn free_path(name: &str) -> PathBuf {
    let candidate = PathBuf::from(name);
    if fs::symlink_metadata(&candidate).is_err() {
        return candidate;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{ext}")),
        _ => (name, String::new()),
    };
    (1u32..)
        .map(|n| PathBuf::from(format!("{stem}-{n}{ext}")))
        .find(|p| fs::symlink_metadata(p).is_err())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_file_name_strips_directories() {
        assert_eq!(safe_file_name("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(safe_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(safe_file_name("C:\\Users\\x\\key.pem").as_deref(), Some("key.pem"));
        assert_eq!(safe_file_name("dir/"), None);
        assert_eq!(safe_file_name(".."), None);
        assert_eq!(safe_file_name("a\u{0}b.txt").as_deref(), Some("ab.txt"));
    }

    #[test]
    fn write_secret_refuses_to_clobber() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.txt");
        fs::write(&path, "existing").unwrap();

        let secret = OpenedSecret {
            content: zeroize::Zeroizing::new(b"new".to_vec()),
            kind: crate::relay::PayloadKind::Text,
            created_at: None,
            expires_at: None,
            max_views: None,
            current_views: 1,
        };

        assert!(write_secret(&path, &secret, false).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "existing");

        write_secret(&path, &secret, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }
}
