use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::error::RowError;
use crate::types::{Outcome, ReconciliationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Check,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Check => "check",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Every row outcome of one run, in processing order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub operation: Operation,
    pub results: Vec<ReconciliationResult>,
}

impl ReconciliationReport {
    pub fn new(operation: Operation) -> Self {
        Self { operation, results: Vec::new() }
    }

    pub fn record(&mut self, result: ReconciliationResult) {
        self.results.push(result);
    }

    pub fn record_success(&mut self, name: &str, outcome: Outcome, monitor_id: i64) {
        self.record(ReconciliationResult {
            name: name.to_string(),
            outcome,
            detail: format!("monitor id {}", monitor_id),
            monitor_id: Some(monitor_id),
        });
    }

    pub fn record_error(&mut self, name: &str, err: &RowError) {
        self.record(ReconciliationResult {
            name: name.to_string(),
            outcome: Outcome::from(err),
            detail: err.to_string(),
            monitor_id: None,
        });
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReconciliationResult> {
        self.results.iter().filter(|r| r.outcome.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn summary(&self) -> ReportSummary {
        let count = |outcome: Outcome| self.results.iter().filter(|r| r.outcome == outcome).count();
        ReportSummary {
            created: count(Outcome::Created),
            updated: count(Outcome::Updated),
            deleted: count(Outcome::Deleted),
            validation_errors: count(Outcome::ValidationError),
            not_found: count(Outcome::NotFound),
            api_errors: count(Outcome::ApiError),
            unsupported_templates: count(Outcome::UnsupportedTemplate),
        }
    }

    /// Writes the failed results as pretty JSON.
    pub fn write_failure_log(&self, path: &Path) -> Result<()> {
        #[derive(Serialize)]
        struct FailureLog<'a> {
            operation: Operation,
            generated_at: String,
            failures: Vec<&'a ReconciliationResult>,
        }

        let log = FailureLog {
            operation: self.operation,
            generated_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            failures: self.failures().collect(),
        };
        let json = serde_json::to_string_pretty(&log).context("serializing failure log")?;
        std::fs::write(path, json).with_context(|| format!("writing failure log to {}", path.display()))
    }
}

/// `<dir>/<stem>_errors.json` beside the workbook.
pub fn failure_log_path(workbook: &Path) -> PathBuf {
    let stem = workbook
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "monitors".to_string());
    workbook.with_file_name(format!("{}_errors.json", stem))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub validation_errors: usize,
    pub not_found: usize,
    pub api_errors: usize,
    pub unsupported_templates: usize,
}

impl ReportSummary {
    pub fn succeeded(&self) -> usize {
        self.created + self.updated + self.deleted
    }

    pub fn failed(&self) -> usize {
        self.validation_errors + self.not_found + self.api_errors + self.unsupported_templates
    }

    pub fn total(&self) -> usize {
        self.succeeded() + self.failed()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows: {} created, {} updated, {} deleted, {} validation errors, {} not found, {} api errors, {} unsupported templates",
            self.total(),
            self.created,
            self.updated,
            self.deleted,
            self.validation_errors,
            self.not_found,
            self.api_errors,
            self.unsupported_templates,
        )
    }
}
