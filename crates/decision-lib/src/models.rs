//! Core data models for the decision maker

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scheduling request for a pod, as submitted by the control plane
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(rename = "podID")]
    pub pod_id: String,
    #[serde(rename = "podName", default)]
    pub pod_name: String,
    #[serde(rename = "nodeID", default)]
    pub node_id: String,
    /// Positive values request elevated priority
    #[serde(default)]
    pub priority: i64,
    #[serde(rename = "executionTime", default)]
    pub execution_time: i64,
    #[serde(rename = "commandRegex", default)]
    pub command_regex: String,
    #[serde(rename = "podLabels", default)]
    pub pod_labels: HashMap<String, String>,
}

/// Key/value pair derived from a pod label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSelector {
    pub key: String,
    pub value: String,
}

/// Per-process hint consumed by the kernel-level scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingIntent {
    pub pid: u32,
    pub priority: bool,
    #[serde(rename = "executionTime")]
    pub execution_time: u64,
    #[serde(rename = "commandRegex")]
    pub command_regex: String,
    pub selectors: Vec<LabelSelector>,
}

/// A process observed inside a pod's cgroup hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodProcess {
    pub pid: u32,
    pub ppid: u32,
    /// Empty when `comm` could not be read
    pub command: String,
    /// Empty when the cgroup path carries no containerd scope
    #[serde(rename = "containerID")]
    pub container_id: String,
}

/// All live processes discovered for one pod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodInfo {
    #[serde(rename = "podUID")]
    pub pod_uid: String,
    pub processes: Vec<PodProcess>,
}

impl PodInfo {
    pub fn new(pod_uid: impl Into<String>) -> Self {
        Self {
            pod_uid: pod_uid.into(),
            processes: Vec::new(),
        }
    }
}

/// Latest counters reported by the userspace scheduler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSet {
    #[serde(rename = "usersched_last_run_at", default)]
    pub user_sched_last_run_at: u64,
    #[serde(default)]
    pub nr_queued: u64,
    #[serde(default)]
    pub nr_scheduled: u64,
    #[serde(default)]
    pub nr_running: u64,
    #[serde(default)]
    pub nr_online_cpus: u64,
    #[serde(default)]
    pub nr_user_dispatches: u64,
    #[serde(default)]
    pub nr_kernel_dispatches: u64,
    #[serde(default)]
    pub nr_cancel_dispatches: u64,
    #[serde(default)]
    pub nr_bounce_dispatches: u64,
    #[serde(default)]
    pub nr_failed_dispatches: u64,
    #[serde(default)]
    pub nr_sched_congested: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_deserializes_wire_names() {
        let json = r#"{
            "podID": "20da609e-6973-4463-a1f9-2db9bcc5becc",
            "podName": "nginx-7c5ddbdf54-x2x9q",
            "nodeID": "worker-1",
            "priority": 5,
            "executionTime": 20000,
            "commandRegex": "nginx",
            "podLabels": {"app": "nginx"}
        }"#;

        let intent: Intent = serde_json::from_str(json).unwrap();
        assert_eq!(intent.pod_id, "20da609e-6973-4463-a1f9-2db9bcc5becc");
        assert_eq!(intent.priority, 5);
        assert_eq!(intent.execution_time, 20000);
        assert_eq!(intent.pod_labels["app"], "nginx");
    }

    #[test]
    fn test_metric_set_missing_fields_default_to_zero() {
        let metrics: MetricSet = serde_json::from_str(r#"{"nr_queued": 3}"#).unwrap();
        assert_eq!(metrics.nr_queued, 3);
        assert_eq!(metrics.nr_running, 0);
        assert_eq!(metrics.user_sched_last_run_at, 0);
    }

    #[test]
    fn test_pod_process_serializes_container_id() {
        let process = PodProcess {
            pid: 42,
            ppid: 1,
            command: "nginx".to_string(),
            container_id: "abc".to_string(),
        };
        let value = serde_json::to_value(&process).unwrap();
        assert_eq!(value["containerID"], "abc");
        assert_eq!(value["ppid"], 1);
    }
}
