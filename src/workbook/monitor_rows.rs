use std::collections::HashMap;

use super::Table;
use crate::error::LoadError;
use crate::types::MonitorRow;

/// Columns a create or update sheet must carry.
pub const MONITOR_COLUMNS: [&str; 6] = ["name", "type", "query", "message", "tags", "options_json"];

/// Deletion only resolves monitors by name.
pub const DELETE_COLUMNS: [&str; 1] = ["name"];

/// Reads monitor rows below the header, skipping fully blank rows.
///
/// Fails when any of `required` is not a header of the sheet. Columns that are
/// present but not required, and cells past the end of a row, read as `""`.
pub fn monitor_rows(table: &Table, required: &[&str]) -> Result<Vec<MonitorRow>, LoadError> {
    let index: HashMap<String, usize> = table
        .headers()
        .into_iter()
        .enumerate()
        .map(|(col, name)| (name, col))
        .collect();

    let missing: Vec<String> = required
        .iter()
        .filter(|c| !index.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns {
            sheet: table.name().to_string(),
            columns: missing,
        });
    }

    let text = |row: usize, column: &str| -> String {
        index
            .get(column)
            .map(|&col| table.cell(row, col).to_string())
            .unwrap_or_default()
    };

    let rows = (1..table.height())
        .filter(|&row| !table.row_is_blank(row))
        .map(|row| MonitorRow {
            sheet_row: row + 1,
            name: text(row, "name"),
            monitor_type: text(row, "type"),
            query: text(row, "query"),
            message: text(row, "message"),
            tags: text(row, "tags"),
            options_json: text(row, "options_json"),
            priority: index.get("priority").map(|&col| table.cell(row, col).to_string()),
        })
        .collect();
    Ok(rows)
}
