//! Output formatting helpers for the CLI.

use std::io::IsTerminal;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use rusqlite::types::ValueRef;

/// Pretty tables only when stdout is a terminal.
pub fn pretty_output() -> bool {
    std::io::stdout().is_terminal()
}

/// Render rows as a bordered table (pretty) or tab-separated lines without a
/// header (plain).
pub fn table(headers: &[String], rows: &[Vec<String>], pretty: bool) -> String {
    if pretty {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(headers);
        for row in rows {
            table.add_row(row);
        }
        table.to_string()
    } else {
        rows.iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Display form of one SQLite value.
pub fn sql_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Blob(bytes) => format!("<{} bytes>", bytes.len()),
    }
}

/// Aligned `key: value` line.
pub fn kv(key: &str, value: impl std::fmt::Display) -> String {
    format!("{:<12} {}", format!("{}:", key), value)
}
