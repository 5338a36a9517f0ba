use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::types::ChecklistEntry;

const LINE_PREFIX: &str = "Missing checkmark at cell ";
const HEADER_MARK: &str = " (Header: ";
pub(crate) const ROW_MARK: &str = ", Row: ";

/// `Missing checkmark at cell <CELL> (Header: <header>, Row: <rowLabel>)`
pub fn format_entry(entry: &ChecklistEntry) -> String {
    format!(
        "{}{}{}{}{}{})",
        LINE_PREFIX, entry.cell, HEADER_MARK, entry.header_label, ROW_MARK, entry.row_label
    )
}

pub fn render_report(entries: &[ChecklistEntry]) -> String {
    entries.iter().map(|e| format_entry(e) + "\n").collect()
}

/// Parses one report line. Lines that do not follow the report format yield `None`.
pub fn parse_line(line: &str) -> Option<ChecklistEntry> {
    let rest = line.trim_end_matches(['\r', '\n']).strip_prefix(LINE_PREFIX)?;
    let (cell, rest) = rest.split_once(HEADER_MARK)?;
    let rest = rest.strip_suffix(')')?;
    let (header, row_label) = rest.split_once(ROW_MARK)?;
    Some(ChecklistEntry {
        header_label: header.to_string(),
        cell: cell.to_string(),
        row_label: row_label.to_string(),
    })
}

pub fn parse_report(text: &str) -> Vec<ChecklistEntry> {
    text.lines()
        .filter_map(|line| {
            let entry = parse_line(line);
            if entry.is_none() && line.starts_with(LINE_PREFIX) {
                warn!("skipping malformed gap report line: {}", line);
            }
            entry
        })
        .collect()
}

pub fn write_report(path: &Path, entries: &[ChecklistEntry]) -> Result<()> {
    std::fs::write(path, render_report(entries))
        .with_context(|| format!("writing gap report to {}", path.display()))
}

pub fn read_report(path: &Path) -> Result<Vec<ChecklistEntry>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading gap report from {}", path.display()))?;
    Ok(parse_report(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(header: &str, cell: &str, row: &str) -> ChecklistEntry {
        ChecklistEntry {
            header_label: header.to_string(),
            cell: cell.to_string(),
            row_label: row.to_string(),
        }
    }

    #[test]
    fn line_format_is_exact() {
        let line = format_entry(&entry("prod-east", "D7", "EKS pod status"));
        assert_eq!(line, "Missing checkmark at cell D7 (Header: prod-east, Row: EKS pod status)");
    }

    #[test]
    fn parses_labels_with_punctuation() {
        let original = entry("prod (east)", "AA12", "EKS pod status, critical (v2)");
        let parsed = parse_line(&format_entry(&original)).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn ignores_foreign_lines() {
        let text = "Check complete!\n\
                    Missing checkmark at cell C3 (Header: a, Row: b)\r\n\
                    Missing checkmark at cell C4 Header: a, Row: b\n\
                    \n";
        assert_eq!(parse_report(text), vec![entry("a", "C3", "b")]);
    }

    #[test]
    fn header_is_cut_at_the_first_row_marker() {
        // A header carrying the row marker cannot be told apart from the row label.
        let parsed = parse_line(&format_entry(&entry("staging, Row: x", "C3", "EKS pod status"))).unwrap();
        assert_eq!(parsed.header_label, "staging");
        assert_eq!(parsed.row_label, "x, Row: EKS pod status");
        assert_eq!(parsed.cell, "C3");
    }

    #[test]
    fn entry_split_across_lines_is_skipped() {
        let text = "Missing checkmark at cell C3 (Header: prod\neast, Row: EKS pod status)\n";
        assert!(parse_report(text).is_empty());
    }

    #[test]
    fn empty_labels_survive() {
        let original = entry("Unnamed: 4", "E3", "");
        assert_eq!(parse_report(&render_report(&[original.clone()])), vec![original]);
    }

    #[test]
    fn file_round_trip_preserves_order() {
        let entries = vec![
            entry("dev", "F3", "EKS pod status"),
            entry("prod-east", "C3", "EKS pod status"),
            entry("prod-east", "C9", "EKS node high cpu"),
        ];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_checkmarks.txt");
        write_report(&path, &entries).unwrap();
        assert_eq!(read_report(&path).unwrap(), entries);

        let first = std::fs::read(&path).unwrap();
        write_report(&path, &entries).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), first);
    }

    #[test]
    fn missing_report_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_report(&dir.path().join("absent.txt")).unwrap_err();
        assert!(err.to_string().contains("reading gap report"));
    }
}
