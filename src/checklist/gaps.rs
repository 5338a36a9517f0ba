use tracing::warn;

use super::report::ROW_MARK;
use crate::types::ChecklistEntry;
use crate::workbook::{column_letter, single_line, Table};

/// Column C: the first two columns identify the row.
pub const FIRST_CHECK_COLUMN: usize = 2;
/// Columns C through H are checkable.
pub const CHECK_COLUMN_COUNT: usize = 6;
pub const NOT_APPLICABLE: &str = "n/a";

const ROW_LABEL_COLUMN: usize = 1;

/// A checklist cell counts as unfilled when it is blank and not marked `n/a`.
pub fn is_unfilled(cell: &str) -> bool {
    let trimmed = cell.trim();
    if trimmed.eq_ignore_ascii_case(NOT_APPLICABLE) {
        return false;
    }
    trimmed.is_empty()
}

/// Finds unfilled checklist cells in the `alert` sheet.
///
/// Sheet row 1 carries the header labels and row 2 is a sub-heading row that
/// is never checked. The number of checked rows equals the count of non-blank
/// column-B cells below the header, starting at sheet row 3 and capped at the
/// last row of the sheet. Entries are stably sorted by header label, so equal
/// headers keep row-major discovery order.
pub fn detect_gaps(alert: &Table) -> Vec<ChecklistEntry> {
    let headers = alert.headers();
    let checked: Vec<(usize, &String)> = headers
        .iter()
        .enumerate()
        .skip(FIRST_CHECK_COLUMN)
        .take(CHECK_COLUMN_COUNT)
        .collect();
    for (_, header) in &checked {
        if header.contains(ROW_MARK) {
            warn!(
                "header '{}' contains '{}', its gap report lines will not parse back exactly",
                header,
                ROW_MARK.trim()
            );
        }
    }

    let labelled_rows = (1..alert.height())
        .filter(|&row| !alert.cell(row, ROW_LABEL_COLUMN).trim().is_empty())
        .count();
    let last_row = (labelled_rows + 1).min(alert.height().saturating_sub(1));

    let mut gaps = Vec::new();
    for row in 2..=last_row {
        let row_label = single_line(alert.cell(row, ROW_LABEL_COLUMN));
        for &(col, header) in &checked {
            if is_unfilled(alert.cell(row, col)) {
                gaps.push(ChecklistEntry {
                    header_label: header.clone(),
                    cell: format!("{}{}", column_letter(col), row + 1),
                    row_label: row_label.clone(),
                });
            }
        }
    }

    gaps.sort_by(|a, b| a.header_label.cmp(&b.header_label));
    gaps
}
