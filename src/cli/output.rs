//! Colored terminal output helpers.
//!
//! All user-facing messages go through these functions so we get
//! consistent styling across every command.  Messages go to stderr;
//! stdout carries only data (a link, or a secret's content) so it can
//! be piped.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::client::OpenedSecret;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    eprintln!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    eprintln!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    eprintln!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print what the relay reported about an opened secret.
pub fn print_secret_details(secret: &OpenedSecret) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);

    let kind = match secret.file_name() {
        Some(name) => format!("file ({name})"),
        None if secret.text().is_some() => "text".to_string(),
        None => "file".to_string(),
    };
    table.add_row(vec!["Type".to_string(), kind]);

    if let Some(mime) = secret.mime_type() {
        table.add_row(vec!["MIME type".to_string(), mime.to_string()]);
    }
    if let Some(created) = secret.created_at {
        table.add_row(vec![
            "Created".to_string(),
            created.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ]);
    }
    table.add_row(vec![
        "Expires".to_string(),
        secret
            .expires_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "never".to_string()),
    ]);
    table.add_row(vec![
        "Views".to_string(),
        match secret.max_views {
            Some(max) => format!("{} of {max}", secret.current_views),
            None => format!("{} (unlimited)", secret.current_views),
        },
    ]);

    eprintln!("{table}");
}
