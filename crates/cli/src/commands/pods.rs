//! Pod discovery commands

use anyhow::Result;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Tabled)]
struct ProcessRow {
    #[tabled(rename = "Pod UID")]
    pod_uid: String,
    #[tabled(rename = "PID")]
    pid: u32,
    #[tabled(rename = "PPID")]
    ppid: u32,
    #[tabled(rename = "Command")]
    command: String,
    #[tabled(rename = "Container")]
    container: String,
}

/// Show live pod to PID mappings
pub async fn list_pods(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let mut pods = client.pod_pids().await?;
    pods.sort_by(|a, b| a.pod_uid.cmp(&b.pod_uid));

    if format == OutputFormat::Json {
        return print_json(&pods);
    }

    let pod_count = pods.len();
    let rows: Vec<ProcessRow> = pods
        .into_iter()
        .flat_map(|pod| {
            let pod_uid = pod.pod_uid;
            pod.processes.into_iter().map(move |process| ProcessRow {
                pod_uid: pod_uid.clone(),
                pid: process.pid,
                ppid: process.ppid,
                command: process.command,
                // Short form, as shown by crictl
                container: process.container_id.chars().take(13).collect(),
            })
        })
        .collect();

    let process_count = rows.len();
    print_table(rows, "No pods discovered on this node");
    if pod_count > 0 {
        println!("\nTotal: {} processes in {} pods", process_count, pod_count);
    }

    Ok(())
}
