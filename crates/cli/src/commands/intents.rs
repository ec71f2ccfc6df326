//! Scheduling intent commands

use anyhow::Result;
use decision_lib::{Intent, SchedulingIntent};
use serde::Deserialize;
use std::path::Path;
use tabled::Tabled;

use super::read_json_file;
use crate::client::ApiClient;
use crate::output::{print_json, print_success, print_table, OutputFormat};

/// Row for the scheduling intents table
#[derive(Tabled)]
struct SchedulingRow {
    #[tabled(rename = "PID")]
    pid: u32,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Exec Time")]
    execution_time: u64,
    #[tabled(rename = "Command Regex")]
    command_regex: String,
    #[tabled(rename = "Selectors")]
    selectors: String,
}

impl From<&SchedulingIntent> for SchedulingRow {
    fn from(intent: &SchedulingIntent) -> Self {
        let mut selectors: Vec<String> = intent
            .selectors
            .iter()
            .map(|s| format!("{}={}", s.key, s.value))
            .collect();
        selectors.sort();

        Self {
            pid: intent.pid,
            priority: if intent.priority { "yes" } else { "no" }.to_string(),
            execution_time: intent.execution_time,
            command_regex: intent.command_regex.clone(),
            selectors: selectors.join(","),
        }
    }
}

/// Intent files hold either the request body or a bare list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IntentsFile {
    Batch { intents: Vec<Intent> },
    List(Vec<Intent>),
}

impl IntentsFile {
    fn into_intents(self) -> Vec<Intent> {
        match self {
            IntentsFile::Batch { intents } | IntentsFile::List(intents) => intents,
        }
    }
}

/// List stored scheduling intents
pub async fn list_intents(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let mut intents = client.list_intents().await?;
    intents.sort_by_key(|intent| intent.pid);

    match format {
        OutputFormat::Json => print_json(&intents)?,
        OutputFormat::Table => {
            let total = intents.len();
            let rows: Vec<SchedulingRow> = intents.iter().map(SchedulingRow::from).collect();
            print_table(rows, "No scheduling intents stored");
            if total > 0 {
                println!("\nTotal: {} scheduling intents", total);
            }
        }
    }

    Ok(())
}

/// Submit a batch of intents read from a JSON file
pub async fn submit_intents(client: &ApiClient, file: &Path, format: OutputFormat) -> Result<()> {
    let intents = read_json_file::<IntentsFile>(file)?.into_intents();
    client.submit_intents(&intents).await?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "success": true,
            "submitted": intents.len(),
        }))?,
        OutputFormat::Table => {
            print_success(&format!("Submitted {} intents", intents.len()));
        }
    }

    Ok(())
}
