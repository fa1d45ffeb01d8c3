//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::session::CredentialKind;
use crate::vault::SecretRecord;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
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
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of saved credentials (no secret values).
pub fn print_records_table(records: &[SecretRecord]) {
    if records.is_empty() {
        info("No credentials in this vault yet.");
        tip("Run `hostvault set <HOST>` to save your first one.");
        return;
    }

    let mut sorted: Vec<&SecretRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        (&a.content.hostname, a.content.kind.as_str())
            .cmp(&(&b.content.hostname, b.content.kind.as_str()))
    });

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Host", "User", "Type", "Ref", "Tags", "Updated"]);

    for r in sorted {
        let tags: Vec<&str> = r.tags.iter().map(String::as_str).collect();
        table.add_row(vec![
            r.content.hostname.clone(),
            r.content.username.clone(),
            CredentialKind::from(r.content.kind).to_string(),
            r.content.reference.clone(),
            tags.join(", "),
            r.date.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}
