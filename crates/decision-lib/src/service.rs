//! Service facade used by the HTTP layer
//!
//! Owns the intent store, the telemetry snapshot and the Prometheus
//! registry they are exported through. Discovery scans run on tokio's
//! blocking pool.

use crate::discovery::{PodMap, ProcessTreeScanner};
use crate::error::Result;
use crate::health::{components, ComponentHealth, HealthRegistry};
use crate::intents::{IntentResolver, IntentStore, ResolutionSummary};
use crate::models::{Intent, MetricSet, SchedulingIntent};
use crate::observability::{ServiceMetrics, StructuredLogger};
use crate::telemetry::{MetricSnapshotStore, SchedulerMetricsCollector};
use prometheus::proto::MetricFamily;
use prometheus::Registry;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Settings needed to build a [`DecisionService`]
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub proc_root: PathBuf,
    pub machine_id: String,
    pub node_name: String,
}

pub struct DecisionService {
    resolver: IntentResolver,
    snapshots: Arc<MetricSnapshotStore>,
    registry: Registry,
    metrics: ServiceMetrics,
    health: HealthRegistry,
    logger: StructuredLogger,
}

impl DecisionService {
    pub fn new(options: ServiceOptions, health: HealthRegistry) -> Result<Self> {
        let registry = Registry::new();
        let snapshots = Arc::new(MetricSnapshotStore::new());

        registry.register(Box::new(SchedulerMetricsCollector::new(
            Arc::clone(&snapshots),
            &options.machine_id,
        )?))?;
        let metrics = ServiceMetrics::new(&registry)?;

        let scanner = ProcessTreeScanner::with_root(options.proc_root);
        Ok(Self {
            resolver: IntentResolver::new(scanner, IntentStore::new()),
            snapshots,
            registry,
            metrics,
            health,
            logger: StructuredLogger::new(options.node_name),
        })
    }

    pub fn health(&self) -> &HealthRegistry {
        &self.health
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    pub fn intent_store(&self) -> &IntentStore {
        self.resolver.store()
    }

    /// Resolve a batch of intents against a fresh scan
    pub async fn process_intents(&self, intents: Vec<Intent>) -> Result<ResolutionSummary> {
        self.metrics.add_intents_received(intents.len());

        let resolver = self.resolver.clone();
        let summary = self
            .run_discovery(move || resolver.resolve(&intents))
            .await?;
        self.metrics.set_pods_discovered(summary.pods_discovered);

        let stored_total = self.intent_store().len();
        self.metrics.set_scheduling_intents_stored(stored_total);
        self.logger.log_intents_resolved(&summary, stored_total);
        Ok(summary)
    }

    /// Every stored scheduling intent, in no particular order
    pub fn list_scheduling_intents(&self) -> Vec<SchedulingIntent> {
        self.intent_store().list_all()
    }

    /// Live pod map from a fresh scan
    pub async fn pod_infos(&self) -> Result<PodMap> {
        let scanner = self.resolver.scanner().clone();
        let pods = self.run_discovery(move || scanner.scan()).await?;
        self.metrics.set_pods_discovered(pods.len());
        Ok(pods)
    }

    /// Replace the telemetry snapshot; the first report clears the pending
    /// `telemetry` health state
    pub async fn update_metrics(&self, snapshot: MetricSet) {
        self.snapshots.update(snapshot);
        self.metrics.inc_telemetry_updates();
        self.health.set_healthy(components::TELEMETRY).await;
        self.logger
            .log_telemetry_updated(snapshot.nr_queued, snapshot.nr_running);
    }

    /// Latest scheduler telemetry, `None` until the scheduler reports
    pub fn metrics_snapshot(&self) -> Option<Arc<MetricSet>> {
        self.snapshots.read()
    }

    /// Gather everything exported on the scrape endpoint
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Run scan-backed work on the blocking pool, recording its latency and
    /// the discovery component's health
    async fn run_discovery<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let started = Instant::now();

        let result = match tokio::task::spawn_blocking(work).await {
            Ok(result) => result,
            Err(e) => Err(e.into()),
        };
        self.metrics
            .observe_discovery_latency(started.elapsed().as_secs_f64());

        let discovery_health = match &result {
            Ok(_) => ComponentHealth::healthy(),
            Err(e) => {
                let message = e.to_string();
                self.metrics.inc_discovery_errors();
                self.logger.log_discovery_failed(&message);
                ComponentHealth::unhealthy(message)
            }
        };
        self.health
            .update(components::DISCOVERY, discovery_health)
            .await;
        result
    }
}
