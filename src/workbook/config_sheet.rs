use std::path::Path;

use anyhow::{Context, Result};

use super::Table;

/// Named token arrays from the `config` sheet, one per column.
///
/// Sheet row 1 holds the column name, row 2 is a description row, and the
/// non-blank cells from row 3 down form the column's tokens in sheet order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigEnvironment {
    columns: Vec<(String, Vec<String>)>,
}

impl ConfigEnvironment {
    pub fn from_table(table: &Table) -> Self {
        let columns = table
            .headers()
            .into_iter()
            .enumerate()
            .map(|(col, name)| {
                let tokens = (2..table.height())
                    .map(|row| table.cell(row, col).trim())
                    .filter(|cell| !cell.is_empty())
                    .map(str::to_string)
                    .collect();
                (name, tokens)
            })
            .collect();
        Self { columns }
    }

    pub fn from_columns<I, N, T>(columns: I) -> Self
    where
        I: IntoIterator<Item = (N, Vec<T>)>,
        N: Into<String>,
        T: Into<String>,
    {
        let columns = columns
            .into_iter()
            .map(|(name, tokens)| (name.into(), tokens.into_iter().map(Into::into).collect()))
            .collect();
        Self { columns }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, tokens)| tokens.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Plain-text dump: `name:` then one token per line, blank line between columns.
    pub fn render_dump(&self) -> String {
        let mut out = String::new();
        for (name, tokens) in &self.columns {
            out.push_str(name);
            out.push_str(":\n");
            for token in tokens {
                out.push_str(token);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }

    pub fn write_dump(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render_dump())
            .with_context(|| format!("writing config dump to {}", path.display()))
    }
}
