//! Decision Maker - node-local scheduling intent service
//!
//! Runs as a DaemonSet on each Kubernetes node, mapping pod-level
//! scheduling intents onto live processes and holding the latest
//! userspace scheduler telemetry.

use anyhow::Result;
use decision_lib::{DecisionService, HealthRegistry, ServiceOptions};
use decision_maker::{api, config::ServiceConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting decision-maker");

    let config = ServiceConfig::load()?;
    let machine_id = config.resolve_machine_id();
    info!(
        node_name = %config.node_name,
        machine_id = %machine_id,
        proc_root = %config.proc_root.display(),
        "Service configured"
    );

    let health_registry = HealthRegistry::with_default_components().await;

    let service = Arc::new(DecisionService::new(
        ServiceOptions {
            proc_root: config.proc_root.clone(),
            machine_id: machine_id.clone(),
            node_name: config.node_name.clone(),
        },
        health_registry.clone(),
    )?);

    let logger = service.logger().clone();
    logger.log_startup(
        SERVICE_VERSION,
        &machine_id,
        &config.proc_root.display().to_string(),
    );

    let app_state = Arc::new(api::AppState::new(service));
    health_registry.set_ready(true).await;

    let shutdown = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        logger.log_shutdown("SIGINT received");
    };

    api::serve(&config.listen_addr(), app_state, shutdown).await?;
    info!("Shut down");

    Ok(())
}
