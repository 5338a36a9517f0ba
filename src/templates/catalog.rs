use super::{EvaluationDelay, MonitorTemplate, NotificationOptions};

const GROUPED: NotificationOptions = NotificationOptions {
    include_tags: true,
    delay: EvaluationDelay::NewGroup(60),
    window_defaults: true,
    preset: Some("hide_all"),
    group_retention: None,
};

const GROUPED_HIDE_HANDLES: NotificationOptions = NotificationOptions {
    preset: Some("hide_handles"),
    ..GROUPED
};

pub const POD_DEPLOYMENT_REPLICA: MonitorTemplate = MonitorTemplate {
    name: "EKS Deployment Replica - {environment} - MSS",
    query: "avg(last_15m):avg:kubernetes_state.deployment.replicas_desired{kube_cluster_name:{cluster}, kube_namespace:{namespace}} by {kube_cluster_name,kube_namespace,kube_deployment} - avg:kubernetes_state.deployment.replicas_available{kube_cluster_name:{cluster}, kube_namespace:{namespace}} by {kube_cluster_name,kube_namespace,kube_deployment} >= 2",
    message: "{{#is_alert}}\nDeployment {{kube_namespace.name}}/{{kube_deployment.name}} on the {cluster} cluster has 2 or more unavailable replicas.\n{{/is_alert}}",
    thresholds: &[("critical", 2)],
    notification: GROUPED,
    priority: 4,
};

pub const ADMIN_API_SERVICE: MonitorTemplate = MonitorTemplate {
    name: "EKS Admin API Service - {environment} - MSS",
    query: "avg(last_5m):avg:kubernetes.containers.running{kube_cluster_name:{cluster},kube_namespace:{namespace}, kube_service:{service}} < 1",
    message: "{{#is_alert}}\n{service} containers are not running in the {cluster} cluster.\n{{/is_alert}}\n",
    thresholds: &[("critical", 1)],
    notification: NotificationOptions {
        include_tags: true,
        delay: EvaluationDelay::NewHost(300),
        window_defaults: true,
        preset: None,
        group_retention: None,
    },
    priority: 4,
};

pub const NODE_HIGH_CPU: MonitorTemplate = MonitorTemplate {
    name: "EKS CLUSTER NODE HIGH CPU USAGE - {environment} - MSS",
    query: "avg(last_5m):100 - avg:system.cpu.idle{eks-cluster-name:{cluster}} by {kube_node} > 90",
    message: "{{#is_warning}}\n\nWarning: CPU usage on {{host.kube_node}} in the {cluster} cluster has exceeded 80%. Current value is {{value}}%.\n\n{{/is_warning}}\n\n{{#is_alert}}\n\nHigh Alert: CPU usage on {{host.kube_node}} in the {cluster} cluster has exceeded 90%. Current value is {{value}}%.\n\n{{/is_alert}}",
    thresholds: &[("critical", 90), ("warning", 80)],
    notification: GROUPED_HIDE_HANDLES,
    priority: 2,
};

pub const NODE_STATUS: MonitorTemplate = MonitorTemplate {
    name: "EKS Cluster Node status - {environment} - MSS",
    query: "max(last_5m):sum:kubernetes_state.node.status{eks-cluster-name:{cluster},status:schedulable} by {node} < 1",
    message: "{{#is_alert}}\n\nThe node {{node.name}} on the {{kube_cluster_name.name}} cluster is not schedulable.\n\n{{/is_alert}}",
    thresholds: &[("critical", 1)],
    notification: NotificationOptions {
        group_retention: Some("1h"),
        ..GROUPED
    },
    priority: 4,
};

pub const POD_MEMORY_LOAD: MonitorTemplate = MonitorTemplate {
    name: "EKS POD Memory Load - {environment} - MSS",
    query: "avg(last_5m):sum:kubernetes.memory.usage{kube_namespace:{namespace}, cluster_name:{cluster}} by {pod_name} > 512000000",
    message: "{{#is_warning}}\n\nMemory load is elevated on {{pod_name.name}}.\n\n{{/is_warning}}\n\n{{#is_alert}}\n\nMemory load is high on {{pod_name.name}}.\n\n{{/is_alert}}",
    thresholds: &[("critical", 512_000_000), ("warning", 256_000_000)],
    notification: GROUPED_HIDE_HANDLES,
    priority: 3,
};

pub const POD_STATEFULSET_REPLICA: MonitorTemplate = MonitorTemplate {
    name: "EKS POD Statefulset Replicas - {environment} - MSS",
    query: "max(last_15m):sum:kubernetes_state.statefulset.replicas_desired{kube_namespace:{namespace}, cluster_name:{cluster}} by {kube_cluster_name,kube_namespace,kube_stateful_set} - sum:kubernetes_state.statefulset.replicas_ready{kube_namespace:{namespace}, cluster_name:{cluster}} by {kube_cluster_name,kube_namespace,kube_stateful_set} >= 2",
    message: "{{#is_alert}}\nMore than one replica is down in statefulset {{kube_namespace.name}}/{{kube_stateful_set.name}}.\n{{/is_alert}}\n",
    thresholds: &[("critical", 2), ("warning", 1)],
    notification: GROUPED_HIDE_HANDLES,
    priority: 3,
};

pub const POD_STATUS: MonitorTemplate = MonitorTemplate {
    name: "EKS Pod Status - {environment} - MSS",
    query: "avg(last_5m):avg:kubernetes_state.pod.status_phase{cluster_name:{cluster}, kube_namespace:{namespace}} by {pod_name} < 1",
    message: "{{#is_alert}}\n\nPod {{pod_name.name}} in {{kube_cluster_name.name}} has failed.\n\n{{/is_alert}}\n",
    thresholds: &[("critical", 1)],
    notification: GROUPED,
    priority: 3,
};

pub const POD_CRASHLOOP: MonitorTemplate = MonitorTemplate {
    name: "EKS Pod CrashLoopBackOff - {environment} - MSS",
    query: "max(last_5m):default_zero(max:kubernetes_state.container.status_report.count.waiting{reason:crashloopbackoff, kube_cluster_name:{cluster}, kube_namespace:{namespace}} by {kube_cluster_name,kube_namespace,pod_name}) >= 3",
    message: "{{#is_alert}}\nPod {{pod_name.name}} in {{kube_namespace.name}} is in CrashLoopBackOff on the {cluster} cluster.\n{{/is_alert}}",
    thresholds: &[("critical", 3)],
    notification: NotificationOptions {
        include_tags: false,
        delay: EvaluationDelay::NewHost(300),
        window_defaults: false,
        preset: None,
        group_retention: None,
    },
    priority: 4,
};
