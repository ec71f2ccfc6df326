//! Scheduler telemetry commands

use anyhow::Result;
use colored::Colorize;
use decision_lib::MetricSet;
use std::path::Path;

use super::read_json_file;
use crate::client::ApiClient;
use crate::output::{print_heading, print_info, print_json, print_success, OutputFormat};

fn metric_lines(snapshot: &MetricSet) -> [(&'static str, u64); 11] {
    [
        ("UserSched Last Run", snapshot.user_sched_last_run_at),
        ("Queued", snapshot.nr_queued),
        ("Scheduled", snapshot.nr_scheduled),
        ("Running", snapshot.nr_running),
        ("Online CPUs", snapshot.nr_online_cpus),
        ("User Dispatches", snapshot.nr_user_dispatches),
        ("Kernel Dispatches", snapshot.nr_kernel_dispatches),
        ("Cancel Dispatches", snapshot.nr_cancel_dispatches),
        ("Bounce Dispatches", snapshot.nr_bounce_dispatches),
        ("Failed Dispatches", snapshot.nr_failed_dispatches),
        ("Congested", snapshot.nr_sched_congested),
    ]
}

/// Show the latest scheduler metrics
pub async fn show_metrics(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let snapshot = client.get_metrics().await?;

    match (format, snapshot) {
        (OutputFormat::Json, snapshot) => print_json(&snapshot)?,
        (OutputFormat::Table, None) => {
            print_info("No metrics data available yet. Waiting for scheduler to report metrics.");
        }
        (OutputFormat::Table, Some(snapshot)) => {
            print_heading("Scheduler Metrics");
            for (label, value) in metric_lines(&snapshot) {
                let value = value.to_string();
                let value = if label == "Failed Dispatches" && value != "0" {
                    value.red().to_string()
                } else {
                    value
                };
                println!("{:<24}{}", format!("{}:", label), value);
            }
        }
    }

    Ok(())
}

/// Push a metrics snapshot read from a JSON file
pub async fn push_metrics(client: &ApiClient, file: &Path, format: OutputFormat) -> Result<()> {
    let snapshot: MetricSet = read_json_file(file)?;
    client.push_metrics(&snapshot).await?;

    match format {
        OutputFormat::Json => print_json(&snapshot)?,
        OutputFormat::Table => print_success("Metrics snapshot pushed"),
    }

    Ok(())
}
