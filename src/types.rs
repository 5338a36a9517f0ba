use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub app_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("app_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Option<Credentials>,
    pub api_url: String,
    pub proxy: Option<String>,
    pub timeout_secs: u64,
    pub workbook_path: PathBuf,
    pub gap_report_path: PathBuf,
    pub config_dump_path: Option<PathBuf>,
}

/// Monitor types accepted by the platform's monitor API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonitorType {
    #[serde(rename = "metric alert")]
    MetricAlert,
    #[serde(rename = "query alert")]
    QueryAlert,
    #[serde(rename = "service check")]
    ServiceCheck,
    #[serde(rename = "event alert")]
    EventAlert,
    #[serde(rename = "log alert")]
    LogAlert,
    #[serde(rename = "process alert")]
    ProcessAlert,
    #[serde(rename = "trace-analytics alert")]
    TraceAnalyticsAlert,
    #[serde(rename = "slo alert")]
    SloAlert,
    #[serde(rename = "composite")]
    Composite,
}

impl MonitorType {
    pub const ALL: [MonitorType; 9] = [
        MonitorType::MetricAlert,
        MonitorType::QueryAlert,
        MonitorType::ServiceCheck,
        MonitorType::EventAlert,
        MonitorType::LogAlert,
        MonitorType::ProcessAlert,
        MonitorType::TraceAnalyticsAlert,
        MonitorType::SloAlert,
        MonitorType::Composite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorType::MetricAlert => "metric alert",
            MonitorType::QueryAlert => "query alert",
            MonitorType::ServiceCheck => "service check",
            MonitorType::EventAlert => "event alert",
            MonitorType::LogAlert => "log alert",
            MonitorType::ProcessAlert => "process alert",
            MonitorType::TraceAnalyticsAlert => "trace-analytics alert",
            MonitorType::SloAlert => "slo alert",
            MonitorType::Composite => "composite",
        }
    }
}

impl fmt::Display for MonitorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MonitorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        MonitorType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unsupported monitor type: {}", s))
    }
}

/// Canonical alert description sent to the monitor API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub monitor_type: MonitorType,
    pub query: String,
    pub message: String,
    pub tags: BTreeSet<String>,
    pub options: serde_json::Map<String, serde_json::Value>,
    pub priority: i64,
}

/// One unfilled cell of the alert checklist matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistEntry {
    pub header_label: String,
    pub cell: String,
    pub row_label: String,
}

/// A raw monitor row from a create / update / delete sheet. Absent cells are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorRow {
    pub sheet_row: usize,
    pub name: String,
    pub monitor_type: String,
    pub query: String,
    pub message: String,
    pub tags: String,
    pub options_json: String,
    pub priority: Option<String>,
}

/// Subset of a monitor as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteMonitor {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Created,
    Updated,
    Deleted,
    ValidationError,
    NotFound,
    ApiError,
    UnsupportedTemplate,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Created => "created",
            Outcome::Updated => "updated",
            Outcome::Deleted => "deleted",
            Outcome::ValidationError => "validation_error",
            Outcome::NotFound => "not_found",
            Outcome::ApiError => "api_error",
            Outcome::UnsupportedTemplate => "unsupported_template",
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Outcome::Created | Outcome::Updated | Outcome::Deleted)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationResult {
    pub name: String,
    pub outcome: Outcome,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_id: Option<i64>,
}
