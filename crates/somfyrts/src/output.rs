use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Print `value` as a single JSON line.
pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// Print key/value rows as a two-column table.
pub fn print_fields(rows: &[(&str, String)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["FIELD", "VALUE"]);
    for (name, value) in rows {
        table.add_row(vec![name.to_string(), value.clone()]);
    }
    println!("{table}");
}

/// Print key/value rows on one line: `a=1 b=2`.
pub fn print_pretty(rows: &[(&str, String)]) {
    let line: Vec<String> = rows
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    println!("{}", line.join(" "));
}

/// Render the rows in whichever human format was asked for.
pub fn print_rows(rows: &[(&str, String)], format: OutputFormat) {
    match format {
        OutputFormat::Table => print_fields(rows),
        _ => print_pretty(rows),
    }
}

pub fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_bytes_is_spaced_uppercase() {
        assert_eq!(hex_bytes(&[0xA7, 0x0E, 0xFF]), "A7 0E FF");
        assert_eq!(hex_bytes(&[]), "");
    }
}
