use std::path::PathBuf;

use thiserror::Error;

use crate::types::Outcome;

/// Failures that stop a whole run before any row is processed.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("workbook source not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("workbook source could not be decoded: {0}")]
    SourceMalformed(String),
    #[error("sheet '{0}' not found in workbook")]
    MissingSheet(String),
    #[error("sheet '{sheet}' is missing required columns: {}", .columns.join(", "))]
    MissingColumns { sheet: String, columns: Vec<String> },
}

/// Failures contained to a single row and recorded in the run report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("no monitor template for checklist row '{row_label}' (header: {header})")]
    UnsupportedTemplate { row_label: String, header: String },
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("monitor '{0}' not found")]
    NotFound(String),
    #[error("{0}")]
    Api(String),
}

impl From<&RowError> for Outcome {
    fn from(err: &RowError) -> Self {
        match err {
            RowError::UnsupportedTemplate { .. } => Outcome::UnsupportedTemplate,
            RowError::Validation(_) => Outcome::ValidationError,
            RowError::NotFound(_) => Outcome::NotFound,
            RowError::Api(_) => Outcome::ApiError,
        }
    }
}
