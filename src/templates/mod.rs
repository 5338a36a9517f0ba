//! Monitor templates keyed by checklist row label.
//!
//! Each known label maps to one [`TemplateKind`]; the kind selects a
//! declarative [`MonitorTemplate`] from [`catalog`]. Patterns interpolate the
//! resolved environment through the `{environment}`, `{cluster}`,
//! `{namespace}` and `{service}` placeholders. Doubled braces such as
//! `{{#is_alert}}` are platform notification syntax and pass through untouched.

pub mod catalog;

use std::collections::BTreeSet;

use serde_json::{json, Map, Value};

use crate::environment::ResolvedEnvironment;
use crate::error::RowError;
use crate::types::{ChecklistEntry, MonitorDefinition, MonitorType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    PodDeploymentReplica,
    AdminApiService,
    NodeHighCpu,
    NodeStatus,
    PodMemoryLoad,
    PodStatefulsetReplica,
    PodStatus,
    PodCrashLoop,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 8] = [
        TemplateKind::PodDeploymentReplica,
        TemplateKind::AdminApiService,
        TemplateKind::NodeHighCpu,
        TemplateKind::NodeStatus,
        TemplateKind::PodMemoryLoad,
        TemplateKind::PodStatefulsetReplica,
        TemplateKind::PodStatus,
        TemplateKind::PodCrashLoop,
    ];

    /// Checklist row label in the alert sheet.
    pub fn label(&self) -> &'static str {
        match self {
            TemplateKind::PodDeploymentReplica => "EKS pod deployment replica",
            TemplateKind::AdminApiService => "EKS Admin api service status",
            TemplateKind::NodeHighCpu => "EKS node high cpu",
            TemplateKind::NodeStatus => "EKS node status",
            TemplateKind::PodMemoryLoad => "EKS pod memory load",
            TemplateKind::PodStatefulsetReplica => "EKS pod statefulset replica",
            TemplateKind::PodStatus => "EKS pod status",
            TemplateKind::PodCrashLoop => "EKS pod crashloopbackoff",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        TemplateKind::ALL.iter().copied().find(|k| k.label() == label)
    }

    pub fn template(&self) -> &'static MonitorTemplate {
        match self {
            TemplateKind::PodDeploymentReplica => &catalog::POD_DEPLOYMENT_REPLICA,
            TemplateKind::AdminApiService => &catalog::ADMIN_API_SERVICE,
            TemplateKind::NodeHighCpu => &catalog::NODE_HIGH_CPU,
            TemplateKind::NodeStatus => &catalog::NODE_STATUS,
            TemplateKind::PodMemoryLoad => &catalog::POD_MEMORY_LOAD,
            TemplateKind::PodStatefulsetReplica => &catalog::POD_STATEFULSET_REPLICA,
            TemplateKind::PodStatus => &catalog::POD_STATUS,
            TemplateKind::PodCrashLoop => &catalog::POD_CRASHLOOP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationDelay {
    NewHost(i64),
    NewGroup(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationOptions {
    pub include_tags: bool,
    pub delay: EvaluationDelay,
    /// Emit `timeout_h`, `require_full_window` and `renotify_interval`.
    pub window_defaults: bool,
    pub preset: Option<&'static str>,
    pub group_retention: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorTemplate {
    pub name: &'static str,
    pub query: &'static str,
    pub message: &'static str,
    pub thresholds: &'static [(&'static str, i64)],
    pub notification: NotificationOptions,
    pub priority: i64,
}

impl MonitorTemplate {
    pub fn render(&self, env: &ResolvedEnvironment) -> MonitorDefinition {
        let tags: BTreeSet<String> = ["env:prod".to_string(), format!("kube_cluster_name:{}", env.cluster)]
            .into_iter()
            .collect();
        MonitorDefinition {
            name: interpolate(self.name, env),
            monitor_type: MonitorType::QueryAlert,
            query: interpolate(self.query, env),
            message: interpolate(self.message, env),
            tags,
            options: self.options(),
            priority: self.priority,
        }
    }

    pub fn options(&self) -> Map<String, Value> {
        let thresholds: Map<String, Value> = self
            .thresholds
            .iter()
            .map(|(level, value)| (level.to_string(), json!(value)))
            .collect();
        let n = &self.notification;

        let mut options = Map::new();
        options.insert("thresholds".to_string(), Value::Object(thresholds));
        options.insert("notify_no_data".to_string(), json!(false));
        options.insert("threshold_windows".to_string(), Value::Null);
        options.insert("notify_audit".to_string(), json!(false));
        options.insert("include_tags".to_string(), json!(n.include_tags));
        match n.delay {
            EvaluationDelay::NewHost(secs) => options.insert("new_host_delay".to_string(), json!(secs)),
            EvaluationDelay::NewGroup(secs) => options.insert("new_group_delay".to_string(), json!(secs)),
        };
        if n.window_defaults {
            options.insert("timeout_h".to_string(), json!(0));
            options.insert("require_full_window".to_string(), json!(false));
            options.insert("renotify_interval".to_string(), json!(0));
        }
        if let Some(preset) = n.preset {
            options.insert("notification_preset_name".to_string(), json!(preset));
        }
        if let Some(retention) = n.group_retention {
            options.insert("group_retention_duration".to_string(), json!(retention));
        }
        options
    }
}

/// Single pass over the pattern; substituted values are never rescanned.
fn interpolate(pattern: &str, env: &ResolvedEnvironment) -> String {
    let placeholders = [
        ("{environment}", env.environment.as_str()),
        ("{cluster}", env.cluster.as_str()),
        ("{namespace}", env.namespace.as_str()),
        ("{service}", env.service.as_str()),
    ];
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match placeholders.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Renders the template behind a checklist entry's row label.
pub fn render_entry(entry: &ChecklistEntry, env: &ResolvedEnvironment) -> Result<MonitorDefinition, RowError> {
    TemplateKind::from_label(&entry.row_label)
        .map(|kind| kind.template().render(env))
        .ok_or_else(|| RowError::UnsupportedTemplate {
            row_label: entry.row_label.clone(),
            header: entry.header_label.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staging_env() -> ResolvedEnvironment {
        ResolvedEnvironment {
            environment: "staging".to_string(),
            cluster: "demo-cluster".to_string(),
            namespace: "payments".to_string(),
            service: "admin-api".to_string(),
        }
    }

    fn entry(row_label: &str) -> ChecklistEntry {
        ChecklistEntry {
            header_label: "staging".to_string(),
            cell: "C3".to_string(),
            row_label: row_label.to_string(),
        }
    }

    #[test]
    fn every_label_round_trips() {
        for kind in TemplateKind::ALL {
            assert_eq!(TemplateKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(TemplateKind::from_label("  EKS pod status "), Some(TemplateKind::PodStatus));
        assert_eq!(TemplateKind::from_label("eks pod status"), None);
        assert_eq!(TemplateKind::from_label("EKS node count increase"), None);
    }

    #[test]
    fn crashloop_template_interpolates_environment() {
        let def = render_entry(&entry("EKS pod crashloopbackoff"), &staging_env()).unwrap();
        assert!(def.query.contains("kube_cluster_name:demo-cluster"));
        assert!(def.query.contains("kube_namespace:payments"));
        assert!(def.tags.contains("env:prod"));
        assert!(def.tags.contains("kube_cluster_name:demo-cluster"));
        assert_eq!(def.priority, 4);
        assert_eq!(def.monitor_type, MonitorType::QueryAlert);
        assert!(def.name.contains("staging"));
        assert_eq!(def.options["thresholds"]["critical"], 3);
        assert_eq!(def.options["new_host_delay"], 300);
        assert!(!def.options.contains_key("timeout_h"));
    }

    #[test]
    fn notification_syntax_is_preserved() {
        let def = TemplateKind::NodeHighCpu.template().render(&staging_env());
        assert!(def.message.contains("{{#is_warning}}"));
        assert!(def.message.contains("{{/is_alert}}"));
        assert!(def.message.contains("{{value}}"));
        assert!(def.message.contains("demo-cluster"));
        assert!(!def.message.contains("{cluster}"));
        assert_eq!(def.options["thresholds"]["warning"], 80);
        assert_eq!(def.options["thresholds"]["critical"], 90);
        assert_eq!(def.priority, 2);
    }

    #[test]
    fn admin_api_uses_service_name() {
        let def = TemplateKind::AdminApiService.template().render(&staging_env());
        assert!(def.query.contains("kube_service:admin-api"));
        assert!(def.message.contains("admin-api"));
        assert!(!def.options.contains_key("notification_preset_name"));
        assert_eq!(def.options["timeout_h"], 0);
    }

    #[test]
    fn node_status_keeps_group_retention() {
        let def = TemplateKind::NodeStatus.template().render(&staging_env());
        assert_eq!(def.options["group_retention_duration"], "1h");
        assert_eq!(def.options["notification_preset_name"], "hide_all");
        assert_eq!(def.options["new_group_delay"], 60);
    }

    #[test]
    fn rendering_is_deterministic_and_placeholder_free() {
        for kind in TemplateKind::ALL {
            let a = kind.template().render(&staging_env());
            let b = kind.template().render(&staging_env());
            assert_eq!(a, b);
            for text in [&a.name, &a.query, &a.message] {
                for placeholder in ["{environment}", "{cluster}", "{namespace}", "{service}"] {
                    assert!(!text.contains(placeholder), "{:?} left {} in {}", kind, placeholder, text);
                }
            }
            assert_eq!(a.tags.len(), 2);
        }
    }

    #[test]
    fn missing_environment_degrades_to_empty_values() {
        let def = TemplateKind::PodStatus.template().render(&ResolvedEnvironment::default());
        assert!(def.query.contains("cluster_name:,"));
        assert!(def.tags.contains("kube_cluster_name:"));
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let env = ResolvedEnvironment {
            environment: "{cluster}".to_string(),
            cluster: "demo".to_string(),
            namespace: "{service}".to_string(),
            service: "admin-api".to_string(),
        };
        let def = TemplateKind::PodStatus.template().render(&env);
        assert!(def.query.contains("kube_namespace:{service}"));
        assert!(!def.query.contains("kube_namespace:admin-api"));
        assert_eq!(def.name, "EKS Pod Status - {cluster} - MSS");
        assert!(def.query.contains("by {pod_name}"));
    }

    #[test]
    fn unknown_label_is_unsupported_template() {
        let err = render_entry(&entry("EKS pod disk pressure"), &staging_env()).unwrap_err();
        assert_eq!(
            err,
            RowError::UnsupportedTemplate {
                row_label: "EKS pod disk pressure".to_string(),
                header: "staging".to_string(),
            }
        );
    }
}
