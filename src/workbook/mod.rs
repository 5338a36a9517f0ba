//! Workbook loading.
//!
//! Every sheet of the source is decoded into a [`Table`] of cell text,
//! addressed by zero-based sheet coordinates (row 0 is sheet row 1, the header
//! row). No cell content is validated here; consumers decide what a cell means.

pub mod config_sheet;
pub mod monitor_rows;

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use tracing::debug;

use crate::error::LoadError;

pub use config_sheet::ConfigEnvironment;
pub use monitor_rows::{monitor_rows, DELETE_COLUMNS, MONITOR_COLUMNS};

pub const CONFIG_SHEET: &str = "config";
pub const ALERT_SHEET: &str = "alert";
pub const CREATE_SHEET: &str = "create";
pub const UPDATE_SHEET: &str = "update";
pub const DELETE_SHEET: &str = "delete";

#[derive(Debug, Clone)]
pub enum WorkbookSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self { name: name.into(), rows }
    }

    /// Convenience constructor for literal cell grids.
    pub fn from_rows<R, S>(name: &str, rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(Into::into).collect())
            .collect();
        Self::new(name, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell text, or `""` outside the used range.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn row_is_blank(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .map(|r| r.iter().all(|c| c.trim().is_empty()))
            .unwrap_or(true)
    }

    /// Column names taken from the header row. Blank headers become
    /// `Unnamed: <col>` and repeated names get `.1`, `.2`, ... suffixes.
    pub fn headers(&self) -> Vec<String> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        (0..self.width())
            .map(|col| {
                let raw = single_line(self.cell(0, col));
                let base = if raw.is_empty() { format!("Unnamed: {}", col) } else { raw };
                let count = seen.entry(base.clone()).or_insert(0);
                let name = if *count == 0 { base } else { format!("{}.{}", base, count) };
                *count += 1;
                name
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Table>,
}

impl Workbook {
    pub fn new(sheets: Vec<Table>) -> Self {
        Self { sheets }
    }

    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find(|t| t.name == name)
    }

    pub fn require_sheet(&self, name: &str) -> Result<&Table, LoadError> {
        self.sheet(name).ok_or_else(|| LoadError::MissingSheet(name.to_string()))
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|t| t.name.as_str()).collect()
    }
}

pub fn load_workbook(source: &WorkbookSource) -> Result<Workbook, LoadError> {
    match source {
        WorkbookSource::Path(path) => load_workbook_from_path(path),
        WorkbookSource::Bytes(bytes) => load_workbook_from_bytes(bytes),
    }
}

pub fn load_workbook_from_path(path: &Path) -> Result<Workbook, LoadError> {
    if !path.is_file() {
        return Err(LoadError::SourceNotFound(path.to_path_buf()));
    }
    let mut sheets = open_workbook_auto(path)
        .map_err(|e| LoadError::SourceMalformed(format!("{}: {}", path.display(), e)))?;
    read_sheets(&mut sheets)
}

pub fn load_workbook_from_bytes(bytes: &[u8]) -> Result<Workbook, LoadError> {
    let mut sheets = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| LoadError::SourceMalformed(e.to_string()))?;
    read_sheets(&mut sheets)
}

fn read_sheets<RS: Read + Seek>(sheets: &mut Sheets<RS>) -> Result<Workbook, LoadError> {
    let mut tables = Vec::new();
    for name in sheets.sheet_names() {
        let range = sheets
            .worksheet_range(&name)
            .map_err(|e| LoadError::SourceMalformed(format!("sheet '{}': {}", name, e)))?;
        let table = table_from_range(&name, &range);
        debug!("loaded sheet '{}' ({} rows)", name, table.height());
        tables.push(table);
    }
    Ok(Workbook::new(tables))
}

/// Converts a used range to a table anchored at A1, padding the leading
/// rows and columns the range does not cover.
pub fn table_from_range(name: &str, range: &Range<Data>) -> Table {
    let Some((first_row, first_col)) = range.start() else {
        return Table::new(name, Vec::new());
    };
    let mut rows = vec![Vec::new(); first_row as usize];
    for cells in range.rows() {
        let mut row = vec![String::new(); first_col as usize];
        row.extend(cells.iter().map(cell_text));
        rows.push(row);
    }
    Table::new(name, rows)
}

fn cell_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Trims a label and folds each run of line breaks (a wrapped cell) into one space.
pub fn single_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_break = false;
    for ch in text.trim().chars() {
        if ch == '\r' || ch == '\n' {
            if !in_break {
                out.push(' ');
            }
            in_break = true;
        } else {
            out.push(ch);
            in_break = false;
        }
    }
    out
}

/// Spreadsheet column letters for a zero-based column index (0 → `A`, 26 → `AA`).
pub fn column_letter(col: usize) -> String {
    let mut n = col + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}
