//! Scheduler telemetry snapshot and its Prometheus export
//!
//! The userspace scheduler pushes a full `MetricSet` at a time. The latest
//! one is kept behind an atomic pointer swap and exported on scrape as one
//! gauge per field, labelled with the reporting machine.

use crate::error::Result;
use crate::models::MetricSet;
use arc_swap::ArcSwapOption;
use prometheus::core::{Collector, Desc, Describer};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, Opts};
use std::sync::Arc;
use tracing::warn;

/// Constant label attached to every scheduler gauge
pub const MACHINE_ID_LABEL: &str = "machine_id";

type FieldReader = fn(&MetricSet) -> u64;

const SCHEDULER_GAUGES: [(&str, &str, FieldReader); 11] = [
    (
        "user_sched_last_run_at",
        "the timestamp of the last user scheduling run",
        |m| m.user_sched_last_run_at,
    ),
    (
        "nr_queued",
        "number of tasks queued in the userspace scheduler",
        |m| m.nr_queued,
    ),
    (
        "nr_scheduled",
        "number of tasks scheduled by the userspace scheduler",
        |m| m.nr_scheduled,
    ),
    (
        "nr_running",
        "number of tasks currently running in the userspace scheduler",
        |m| m.nr_running,
    ),
    (
        "nr_online_cpus",
        "number of online CPUs in the system",
        |m| m.nr_online_cpus,
    ),
    (
        "nr_user_dispatches",
        "number of user-space dispatches",
        |m| m.nr_user_dispatches,
    ),
    (
        "nr_kernel_dispatches",
        "number of kernel-space dispatches",
        |m| m.nr_kernel_dispatches,
    ),
    (
        "nr_cancel_dispatches",
        "number of canceled dispatches",
        |m| m.nr_cancel_dispatches,
    ),
    (
        "nr_bounce_dispatches",
        "number of bounced dispatches",
        |m| m.nr_bounce_dispatches,
    ),
    (
        "nr_failed_dispatches",
        "number of failed dispatches",
        |m| m.nr_failed_dispatches,
    ),
    (
        "nr_sched_congested",
        "number of times the scheduler was congested",
        |m| m.nr_sched_congested,
    ),
];

/// Latest scheduler telemetry, replaced atomically as a whole
#[derive(Debug, Default)]
pub struct MetricSnapshotStore {
    current: ArcSwapOption<MetricSet>,
}

impl MetricSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot
    pub fn update(&self, snapshot: MetricSet) {
        self.current.store(Some(Arc::new(snapshot)));
    }

    /// Current snapshot, or `None` before the first update
    pub fn read(&self) -> Option<Arc<MetricSet>> {
        self.current.load_full()
    }
}

/// Prometheus collector exporting the current snapshot.
///
/// Gauges are rebuilt from one loaded snapshot on every scrape, so a scrape
/// never mixes fields from two updates.
pub struct SchedulerMetricsCollector {
    snapshots: Arc<MetricSnapshotStore>,
    gauges: Vec<(Opts, FieldReader)>,
    descs: Vec<Desc>,
}

impl SchedulerMetricsCollector {
    pub fn new(snapshots: Arc<MetricSnapshotStore>, machine_id: &str) -> Result<Self> {
        let mut gauges = Vec::with_capacity(SCHEDULER_GAUGES.len());
        let mut descs = Vec::with_capacity(SCHEDULER_GAUGES.len());

        for (name, help, read_field) in SCHEDULER_GAUGES {
            let opts = Opts::new(name, help).const_label(MACHINE_ID_LABEL, machine_id);
            descs.push(opts.describe()?);
            gauges.push((opts, read_field));
        }

        Ok(Self {
            snapshots,
            gauges,
            descs,
        })
    }
}

impl Collector for SchedulerMetricsCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let Some(snapshot) = self.snapshots.read() else {
            return Vec::new();
        };

        let mut families = Vec::with_capacity(self.gauges.len());
        for (opts, read_field) in &self.gauges {
            match Gauge::with_opts(opts.clone()) {
                Ok(gauge) => {
                    gauge.set(read_field(&snapshot) as f64);
                    families.extend(gauge.collect());
                }
                Err(e) => warn!(metric = %opts.name, error = %e, "Failed to build scheduler gauge"),
            }
        }
        families
    }
}
