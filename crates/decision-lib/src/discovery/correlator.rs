//! Aggregation of scanned processes into per-pod records

use crate::models::{PodInfo, PodProcess};
use std::collections::HashMap;

/// Pod UID -> discovered pod
pub type PodMap = HashMap<String, PodInfo>;

/// Folds processes into a map holding at most one `PodInfo` per pod UID
#[derive(Debug, Default)]
pub struct PodCorrelator {
    pods: PodMap,
}

impl PodCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `process` to the pod, creating the pod on first sight
    pub fn add(&mut self, pod_uid: &str, process: PodProcess) {
        self.pods
            .entry(pod_uid.to_string())
            .or_insert_with(|| PodInfo::new(pod_uid))
            .processes
            .push(process);
    }

    pub fn into_pods(self) -> PodMap {
        self.pods
    }
}
