//! Applies create / update / delete against the monitor API.
//!
//! Rows are processed in order, one remote call at a time. A failing row is
//! recorded in the report and never stops the batch.

use tracing::{info, warn};

use crate::datadog::{ApiError, MonitorApi};
use crate::environment;
use crate::error::RowError;
use crate::report::{Operation, ReconciliationReport};
use crate::templates;
use crate::types::{ChecklistEntry, MonitorDefinition, MonitorRow, Outcome};
use crate::validation::{definition_from_row, validate_definition};
use crate::workbook::ConfigEnvironment;

/// A checklist gap with the definition its template produced, or why it could not.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedMonitor {
    pub entry: ChecklistEntry,
    pub definition: Result<MonitorDefinition, RowError>,
}

impl PlannedMonitor {
    pub fn display_name(&self) -> String {
        match &self.definition {
            Ok(def) => def.name.clone(),
            Err(_) => format!("{} [{}]", self.entry.row_label, self.entry.cell),
        }
    }
}

/// Resolves each gap's environment and renders its template. No remote calls.
pub fn plan_checklist(entries: &[ChecklistEntry], config: &ConfigEnvironment) -> Vec<PlannedMonitor> {
    entries
        .iter()
        .map(|entry| {
            let env = environment::resolve(entry, config);
            let definition = templates::render_entry(entry, &env).and_then(|def| {
                let errors = validate_definition(&def);
                if errors.is_empty() {
                    Ok(def)
                } else {
                    Err(RowError::Validation(errors))
                }
            });
            PlannedMonitor { entry: entry.clone(), definition }
        })
        .collect()
}

fn row_name(row: &MonitorRow) -> String {
    let name = row.name.trim();
    if name.is_empty() {
        format!("<row {}>", row.sheet_row)
    } else {
        name.to_string()
    }
}

fn api_error(err: ApiError) -> RowError {
    RowError::Api(err.to_string())
}

pub struct ReconciliationEngine<'a, A: MonitorApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: MonitorApi + ?Sized> ReconciliationEngine<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    pub async fn create(&self, rows: &[MonitorRow]) -> ReconciliationReport {
        let mut report = ReconciliationReport::new(Operation::Create);
        for row in rows {
            let outcome = self.create_row(row).await;
            record(&mut report, &row_name(row), Outcome::Created, outcome);
        }
        report
    }

    pub async fn update(&self, rows: &[MonitorRow]) -> ReconciliationReport {
        let mut report = ReconciliationReport::new(Operation::Update);
        for row in rows {
            let outcome = self.update_row(row).await;
            record(&mut report, &row_name(row), Outcome::Updated, outcome);
        }
        report
    }

    pub async fn delete(&self, rows: &[MonitorRow]) -> ReconciliationReport {
        let mut report = ReconciliationReport::new(Operation::Delete);
        for row in rows {
            let outcome = self.delete_row(row).await;
            record(&mut report, &row_name(row), Outcome::Deleted, outcome);
        }
        report
    }

    /// Creates a monitor for every checklist gap that has a template.
    pub async fn check(&self, entries: &[ChecklistEntry], config: &ConfigEnvironment) -> ReconciliationReport {
        let mut report = ReconciliationReport::new(Operation::Check);
        for planned in plan_checklist(entries, config) {
            let name = planned.display_name();
            let outcome = match &planned.definition {
                Ok(def) => self.api.create_monitor(def).await.map_err(api_error),
                Err(err) => Err(err.clone()),
            };
            record(&mut report, &name, Outcome::Created, outcome);
        }
        report
    }

    /// First monitor in listing order whose name matches exactly.
    pub async fn find_monitor_id(&self, name: &str) -> Result<i64, RowError> {
        let monitors = self.api.list_monitors().await.map_err(api_error)?;
        monitors
            .into_iter()
            .find(|m| m.name == name)
            .map(|m| m.id)
            .ok_or_else(|| RowError::NotFound(name.to_string()))
    }

    async fn create_row(&self, row: &MonitorRow) -> Result<i64, RowError> {
        let def = definition_from_row(row)?;
        self.api.create_monitor(&def).await.map_err(api_error)
    }

    async fn update_row(&self, row: &MonitorRow) -> Result<i64, RowError> {
        let def = definition_from_row(row)?;
        let id = self.find_monitor_id(&def.name).await?;
        self.api.update_monitor(id, &def).await.map_err(api_error)
    }

    async fn delete_row(&self, row: &MonitorRow) -> Result<i64, RowError> {
        let name = row.name.trim();
        if name.is_empty() {
            return Err(RowError::Validation(vec!["Missing name".to_string()]));
        }
        let id = self.find_monitor_id(name).await?;
        self.api.delete_monitor(id).await.map_err(api_error)?;
        Ok(id)
    }
}

fn record(report: &mut ReconciliationReport, name: &str, success: Outcome, outcome: Result<i64, RowError>) {
    match outcome {
        Ok(id) => {
            info!("{} monitor '{}' (id {})", success, name, id);
            report.record_success(name, success, id);
        }
        Err(err) => {
            warn!("{} for '{}': {}", Outcome::from(&err), name, err);
            report.record_error(name, &err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RemoteMonitor;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeApi {
        monitors: Vec<RemoteMonitor>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn with_monitors(monitors: &[(i64, &str)]) -> Self {
            Self {
                monitors: monitors
                    .iter()
                    .map(|(id, name)| RemoteMonitor { id: *id, name: name.to_string() })
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn log(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl MonitorApi for FakeApi {
        async fn validate_credentials(&self) -> Result<bool, ApiError> {
            Ok(true)
        }

        async fn create_monitor(&self, def: &MonitorDefinition) -> Result<i64, ApiError> {
            self.log(format!("create {}", def.name));
            Ok(100)
        }

        async fn update_monitor(&self, id: i64, def: &MonitorDefinition) -> Result<i64, ApiError> {
            self.log(format!("update {} {}", id, def.name));
            Ok(id)
        }

        async fn delete_monitor(&self, id: i64) -> Result<(), ApiError> {
            self.log(format!("delete {}", id));
            Ok(())
        }

        async fn list_monitors(&self) -> Result<Vec<RemoteMonitor>, ApiError> {
            self.log("list".to_string());
            Ok(self.monitors.clone())
        }
    }

    fn row(name: &str, monitor_type: &str) -> MonitorRow {
        MonitorRow {
            sheet_row: 2,
            name: name.to_string(),
            monitor_type: monitor_type.to_string(),
            query: "avg(last_5m):avg:system.load.1{*} > 4".to_string(),
            message: "load is high".to_string(),
            tags: "env:prod".to_string(),
            options_json: String::new(),
            priority: None,
        }
    }

    #[test]
    fn invalid_type_never_reaches_the_api() {
        let api = FakeApi::default();
        let engine = ReconciliationEngine::new(&api);
        let report = tokio_test::block_on(engine.create(&[row("Load", "nonsense"), row("Load 2", "metric alert")]));

        assert_eq!(report.results[0].outcome, Outcome::ValidationError);
        assert!(report.results[0].detail.contains("Unsupported or missing monitor type"));
        assert_eq!(report.results[1].outcome, Outcome::Created);
        assert_eq!(api.calls(), vec!["create Load 2"]);
    }

    #[test]
    fn duplicate_names_resolve_to_first_listed() {
        let api = FakeApi::with_monitors(&[(7, "Load"), (9, "Load")]);
        let engine = ReconciliationEngine::new(&api);
        assert_eq!(tokio_test::block_on(engine.find_monitor_id("Load")), Ok(7));
        assert_eq!(
            tokio_test::block_on(engine.find_monitor_id("load")),
            Err(RowError::NotFound("load".to_string()))
        );
    }

    #[test]
    fn delete_blank_name_is_validation_error() {
        let api = FakeApi::with_monitors(&[(1, "")]);
        let engine = ReconciliationEngine::new(&api);
        let report = tokio_test::block_on(engine.delete(&[row(" ", "")]));
        assert_eq!(report.results[0].outcome, Outcome::ValidationError);
        assert_eq!(report.results[0].name, "<row 2>");
        assert!(api.calls().is_empty());
    }

    #[test]
    fn plan_reports_unsupported_and_rendered_entries() {
        let config = ConfigEnvironment::from_columns(vec![(
            "staging",
            vec!["env", "environment=staging", "cluster=demo", "namespace=web"],
        )]);
        let entries = vec![
            ChecklistEntry {
                header_label: "staging".to_string(),
                cell: "C3".to_string(),
                row_label: "EKS pod status".to_string(),
            },
            ChecklistEntry {
                header_label: "staging".to_string(),
                cell: "C4".to_string(),
                row_label: "EKS node count increase".to_string(),
            },
        ];
        let plan = plan_checklist(&entries, &config);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].display_name(), "EKS Pod Status - staging - MSS");
        assert!(matches!(plan[1].definition, Err(RowError::UnsupportedTemplate { .. })));
        assert_eq!(plan[1].display_name(), "EKS node count increase [C4]");
    }
}
