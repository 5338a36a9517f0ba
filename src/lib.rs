// Public modules
pub mod types;
pub mod error;
pub mod config;
pub mod workbook;
pub mod checklist;
pub mod environment;
pub mod templates;
pub mod validation;
pub mod datadog;
pub mod reconcile;
pub mod report;

// Re-export commonly used items
pub use types::*;
pub use error::{LoadError, RowError};
pub use config::{load_config, load_config_with_env, require_credentials, EnvironmentProvider, SystemEnvironment, MockEnvironment};
pub use workbook::{load_workbook, ConfigEnvironment, Table, Workbook, WorkbookSource};
pub use checklist::{detect_gaps, parse_report, read_report, render_report, write_report};
pub use environment::{resolve, ResolvedEnvironment};
pub use templates::{render_entry, TemplateKind};
pub use validation::{definition_from_row, validate_row};
pub use datadog::{ApiError, DatadogClient, MonitorApi};
pub use reconcile::{plan_checklist, PlannedMonitor, ReconciliationEngine};
pub use report::{failure_log_path, Operation, ReconciliationReport, ReportSummary};
