//! Resolution of pod-level intents onto live processes

use super::store::{intent_key, IntentStore};
use crate::discovery::{PodMap, ProcessTreeScanner};
use crate::error::Result;
use crate::models::{Intent, LabelSelector, PodInfo, SchedulingIntent};
use serde::Serialize;
use tracing::{debug, info};

/// Command name of the pod sandbox process
pub const PAUSE_COMMAND: &str = "pause";

/// Counts from one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionSummary {
    pub intents_received: usize,
    pub intents_matched: usize,
    pub intents_skipped: usize,
    pub entries_stored: usize,
    pub pods_discovered: usize,
}

/// Maps intents onto the processes found by a fresh discovery scan
#[derive(Clone)]
pub struct IntentResolver {
    scanner: ProcessTreeScanner,
    store: IntentStore,
}

impl IntentResolver {
    pub fn new(scanner: ProcessTreeScanner, store: IntentStore) -> Self {
        Self { scanner, store }
    }

    pub fn scanner(&self) -> &ProcessTreeScanner {
        &self.scanner
    }

    pub fn store(&self) -> &IntentStore {
        &self.store
    }

    /// Scan the process table and store one scheduling intent per
    /// non-pause process of every targeted pod.
    ///
    /// Fails only when the scan itself fails. Intents for pods with no
    /// visible processes are skipped.
    pub fn resolve(&self, intents: &[Intent]) -> Result<ResolutionSummary> {
        let pods = self.scanner.scan()?;
        Ok(self.apply(intents, &pods))
    }

    /// Resolve against an already discovered pod map
    pub fn apply(&self, intents: &[Intent], pods: &PodMap) -> ResolutionSummary {
        let mut summary = ResolutionSummary {
            intents_received: intents.len(),
            pods_discovered: pods.len(),
            ..Default::default()
        };

        for intent in intents {
            let Some(pod) = pods.get(&intent.pod_id) else {
                debug!(
                    pod_id = %intent.pod_id,
                    pod_name = %intent.pod_name,
                    node_id = %intent.node_id,
                    "No live processes for pod, skipping intent"
                );
                summary.intents_skipped += 1;
                continue;
            };

            let resolved = scheduling_intents_for(intent, pod);
            if resolved.is_empty() {
                summary.intents_skipped += 1;
                continue;
            }

            summary.intents_matched += 1;
            for scheduling_intent in resolved {
                debug!(
                    pod_id = %intent.pod_id,
                    pid = scheduling_intent.pid,
                    priority = scheduling_intent.priority,
                    execution_time = scheduling_intent.execution_time,
                    "Created scheduling intent"
                );
                self.store.store(
                    intent_key(&intent.pod_id, scheduling_intent.pid),
                    vec![scheduling_intent],
                );
                summary.entries_stored += 1;
            }
        }

        info!(
            intents = summary.intents_received,
            matched = summary.intents_matched,
            stored = summary.entries_stored,
            pods = summary.pods_discovered,
            "Processed intents"
        );
        summary
    }
}

/// Build the per-process intents for one pod, excluding the sandbox process
pub fn scheduling_intents_for(intent: &Intent, pod: &PodInfo) -> Vec<SchedulingIntent> {
    let selectors = label_selectors(intent);

    pod.processes
        .iter()
        .filter(|process| process.command != PAUSE_COMMAND)
        .map(|process| SchedulingIntent {
            pid: process.pid,
            priority: intent.priority > 0,
            // Two's-complement reinterpretation, matching the scheduler's u64 field
            execution_time: intent.execution_time as u64,
            command_regex: intent.command_regex.clone(),
            selectors: selectors.clone(),
        })
        .collect()
}

fn label_selectors(intent: &Intent) -> Vec<LabelSelector> {
    intent
        .pod_labels
        .iter()
        .map(|(key, value)| LabelSelector {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PodProcess;
    use std::collections::HashMap;

    const POD_ID: &str = "20da609e-6973-4463-a1f9-2db9bcc5becc";

    fn process(pid: u32, command: &str) -> PodProcess {
        PodProcess {
            pid,
            ppid: 1,
            command: command.to_string(),
            container_id: String::new(),
        }
    }

    fn pod_map(processes: Vec<PodProcess>) -> PodMap {
        let mut pods = HashMap::new();
        pods.insert(
            POD_ID.to_string(),
            PodInfo {
                pod_uid: POD_ID.to_string(),
                processes,
            },
        );
        pods
    }

    fn intent(priority: i64) -> Intent {
        Intent {
            pod_id: POD_ID.to_string(),
            pod_name: "nginx".to_string(),
            node_id: "node-1".to_string(),
            priority,
            execution_time: 20_000,
            command_regex: "nginx.*".to_string(),
            pod_labels: HashMap::from([("app".to_string(), "nginx".to_string())]),
        }
    }

    fn resolver() -> IntentResolver {
        IntentResolver::new(ProcessTreeScanner::with_root("/nonexistent"), IntentStore::new())
    }

    #[test]
    fn test_three_processes_yield_three_entries() {
        let resolver = resolver();
        let pods = pod_map(vec![
            process(10, "pause"),
            process(11, "nginx"),
            process(12, "nginx"),
            process(13, "sidecar"),
        ]);

        let summary = resolver.apply(&[intent(5)], &pods);
        assert_eq!(summary.entries_stored, 3);
        assert_eq!(summary.intents_matched, 1);

        let store = resolver.store();
        assert_eq!(store.len(), 3);
        for pid in [11, 12, 13] {
            let value = store.get(&intent_key(POD_ID, pid)).unwrap();
            assert_eq!(value.len(), 1);
            assert_eq!(value[0].pid, pid);
            assert!(value[0].priority);
            assert_eq!(value[0].execution_time, 20_000);
            assert_eq!(value[0].command_regex, "nginx.*");
            assert_eq!(
                value[0].selectors,
                vec![LabelSelector {
                    key: "app".to_string(),
                    value: "nginx".to_string()
                }]
            );
        }
        assert!(store.get(&intent_key(POD_ID, 10)).is_none());
    }

    #[test]
    fn test_unknown_pod_stores_nothing() {
        let resolver = resolver();
        let pods = pod_map(vec![process(11, "nginx")]);
        let mut unknown = intent(5);
        unknown.pod_id = "00000000-0000-0000-0000-000000000000".to_string();

        let summary = resolver.apply(&[unknown], &pods);
        assert_eq!(summary.entries_stored, 0);
        assert_eq!(summary.intents_skipped, 1);
        assert!(resolver.store().is_empty());
    }

    #[test]
    fn test_pause_only_pod_stores_nothing() {
        let resolver = resolver();
        let pods = pod_map(vec![process(10, "pause")]);

        let summary = resolver.apply(&[intent(1)], &pods);
        assert_eq!(summary.entries_stored, 0);
        assert!(resolver.store().is_empty());
    }

    #[test]
    fn test_priority_collapses_to_flag() {
        let pod = PodInfo {
            pod_uid: POD_ID.to_string(),
            processes: vec![process(11, "nginx")],
        };
        assert!(scheduling_intents_for(&intent(1), &pod)[0].priority);
        assert!(!scheduling_intents_for(&intent(0), &pod)[0].priority);
        assert!(!scheduling_intents_for(&intent(-3), &pod)[0].priority);
    }

    #[test]
    fn test_later_resolution_replaces_entry() {
        let resolver = resolver();
        let pods = pod_map(vec![process(11, "nginx")]);

        resolver.apply(&[intent(5)], &pods);
        let mut update = intent(0);
        update.execution_time = 1;
        resolver.apply(&[update], &pods);

        let value = resolver.store().get(&intent_key(POD_ID, 11)).unwrap();
        assert_eq!(value.len(), 1);
        assert!(!value[0].priority);
        assert_eq!(value[0].execution_time, 1);
    }

    #[test]
    fn test_resolve_propagates_root_failure() {
        let resolver = resolver();
        assert!(resolver.resolve(&[intent(5)]).is_err());
        assert!(resolver.store().is_empty());
    }
}
