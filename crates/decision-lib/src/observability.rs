//! Observability infrastructure for the decision maker
//!
//! Provides:
//! - Prometheus metrics about the service itself (intent throughput,
//!   discovery latency and failures, store size)
//! - Structured JSON logging with tracing

use crate::error::Result;
use crate::intents::ResolutionSummary;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use tracing::{info, warn};

/// Histogram buckets for discovery scans (in seconds)
const DISCOVERY_BUCKETS: &[f64] = &[
    0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
];

/// Service metrics registered into an explicitly owned registry
#[derive(Clone)]
pub struct ServiceMetrics {
    intents_received: IntCounter,
    scheduling_intents_stored: IntGauge,
    discovery_latency_seconds: Histogram,
    discovery_errors: IntCounter,
    pods_discovered: IntGauge,
    telemetry_updates: IntCounter,
}

impl ServiceMetrics {
    /// Create the metrics and register them with `registry`
    pub fn new(registry: &Registry) -> Result<Self> {
        let metrics = Self {
            intents_received: IntCounter::new(
                "decision_maker_intents_received_total",
                "Total number of intents received for resolution",
            )?,
            scheduling_intents_stored: IntGauge::new(
                "decision_maker_scheduling_intents_stored",
                "Number of scheduling intent entries currently stored",
            )?,
            discovery_latency_seconds: Histogram::with_opts(
                HistogramOpts::new(
                    "decision_maker_discovery_latency_seconds",
                    "Time spent scanning the process table",
                )
                .buckets(DISCOVERY_BUCKETS.to_vec()),
            )?,
            discovery_errors: IntCounter::new(
                "decision_maker_discovery_errors_total",
                "Total number of failed process table scans",
            )?,
            pods_discovered: IntGauge::new(
                "decision_maker_pods_discovered",
                "Number of pods with live processes seen by the last scan",
            )?,
            telemetry_updates: IntCounter::new(
                "decision_maker_telemetry_updates_total",
                "Total number of scheduler telemetry updates received",
            )?,
        };

        registry.register(Box::new(metrics.intents_received.clone()))?;
        registry.register(Box::new(metrics.scheduling_intents_stored.clone()))?;
        registry.register(Box::new(metrics.discovery_latency_seconds.clone()))?;
        registry.register(Box::new(metrics.discovery_errors.clone()))?;
        registry.register(Box::new(metrics.pods_discovered.clone()))?;
        registry.register(Box::new(metrics.telemetry_updates.clone()))?;

        Ok(metrics)
    }

    /// Record a discovery scan latency observation
    pub fn observe_discovery_latency(&self, duration_secs: f64) {
        self.discovery_latency_seconds.observe(duration_secs);
    }

    pub fn inc_discovery_errors(&self) {
        self.discovery_errors.inc();
    }

    pub fn add_intents_received(&self, count: usize) {
        self.intents_received.inc_by(count as u64);
    }

    pub fn set_scheduling_intents_stored(&self, count: usize) {
        self.scheduling_intents_stored.set(count as i64);
    }

    pub fn set_pods_discovered(&self, count: usize) {
        self.pods_discovered.set(count as i64);
    }

    pub fn inc_telemetry_updates(&self) {
        self.telemetry_updates.inc();
    }
}

/// Structured logger for service events
#[derive(Clone)]
pub struct StructuredLogger {
    node_name: String,
}

impl StructuredLogger {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
        }
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, machine_id: &str, proc_root: &str) {
        info!(
            event = "service_started",
            node = %self.node_name,
            version = %version,
            machine_id = %machine_id,
            proc_root = %proc_root,
            "Decision maker started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            node = %self.node_name,
            reason = %reason,
            "Decision maker shutting down"
        );
    }

    /// Log the outcome of one intent batch
    pub fn log_intents_resolved(&self, summary: &ResolutionSummary, stored_total: usize) {
        info!(
            event = "intents_resolved",
            node = %self.node_name,
            intents = summary.intents_received,
            matched = summary.intents_matched,
            skipped = summary.intents_skipped,
            entries_stored = summary.entries_stored,
            pods_discovered = summary.pods_discovered,
            stored_total = stored_total,
            "Resolved intent batch"
        );
    }

    pub fn log_telemetry_updated(&self, nr_queued: u64, nr_running: u64) {
        info!(
            event = "telemetry_updated",
            node = %self.node_name,
            nr_queued = nr_queued,
            nr_running = nr_running,
            "Scheduler telemetry updated"
        );
    }

    pub fn log_discovery_failed(&self, error: &str) {
        warn!(
            event = "discovery_failed",
            node = %self.node_name,
            error = %error,
            "Process table scan failed"
        );
    }
}
