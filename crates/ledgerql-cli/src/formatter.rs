//! Output formatting for query results.
//!
//! Supports table, JSON, and CSV output. Row fields are named, so the
//! column set of a result is the union of field names across its rows.

use comfy_table::{Cell, ContentArrangement, Table};

use ledgerql::{MutationResult, Row, Value};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Formatted table output.
    Table,
    /// JSON output.
    Json,
    /// CSV output.
    Csv,
}

/// Formats a row set according to the specified format.
pub fn format_rows(rows: &[Row], format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => format_table(rows),
        OutputFormat::Json => format_json(rows),
        OutputFormat::Csv => format_csv(rows),
    }
}

/// Formats a mutation outcome as a one-line summary.
pub fn format_mutation(result: &MutationResult) -> String {
    match result {
        MutationResult::Inserted { key } => format!("inserted row {key}"),
        MutationResult::Updated { rows } => format!("updated {rows} row(s)"),
        MutationResult::Deleted { rows } => format!("deleted {rows} row(s)"),
    }
}

/// The union of field names across all rows, sorted.
fn columns(rows: &[Row]) -> Vec<String> {
    let mut names: Vec<String> = rows
        .iter()
        .flat_map(|row| row.field_names().cloned())
        .collect();
    names.sort_unstable();
    names.dedup();
    names
}

fn cell_text(row: &Row, column: &str) -> String {
    match row.get(column) {
        Some(value) => value.to_string(),
        None => String::new(),
    }
}

/// Formats rows as a bordered table.
fn format_table(rows: &[Row]) -> String {
    if rows.is_empty() {
        return "(0 rows)".to_string();
    }

    let columns = columns(rows);
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    table.set_header(columns.iter().map(Cell::new));
    for row in rows {
        table.add_row(columns.iter().map(|col| Cell::new(cell_text(row, col))));
    }

    format!("{table}\n({} rows)", rows.len())
}

/// Formats rows as pretty-printed JSON.
fn format_json(rows: &[Row]) -> String {
    serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string())
}

/// Formats rows as CSV with a header line.
fn format_csv(rows: &[Row]) -> String {
    let columns = columns(rows);
    let mut out = columns.join(",");
    for row in rows {
        out.push('\n');
        let line: Vec<String> = columns
            .iter()
            .map(|col| csv_escape(row.get(col)))
            .collect();
        out.push_str(&line.join(","));
    }
    out
}

fn csv_escape(value: Option<&Value>) -> String {
    let text = match value {
        Some(value) => value.to_string(),
        None => return String::new(),
    };
    if text.contains(',') || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}
