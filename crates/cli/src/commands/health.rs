//! Service health command

use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{color_status, print_heading, print_json, print_table, OutputFormat};

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

/// Show component health and readiness
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health = client.health().await?;
    let readiness = client.readiness().await?;

    match format {
        OutputFormat::Json => print_json(&json!({
            "health": health,
            "readiness": readiness,
        }))?,
        OutputFormat::Table => {
            print_heading("Decision Maker Health");
            println!("API:        {}", client.base_url().as_str().cyan());
            println!("Status:     {}", color_status(status_name(&health.status)));
            let ready = if readiness.ready { "ready" } else { "not ready" };
            println!("Readiness:  {}", color_status(ready));
            if let Some(reason) = &readiness.reason {
                println!("Reason:     {}", reason);
            }
            println!();

            let mut components: Vec<_> = health.components.into_iter().collect();
            components.sort_by(|a, b| a.0.cmp(&b.0));
            let rows: Vec<ComponentRow> = components
                .into_iter()
                .map(|(name, component)| ComponentRow {
                    name,
                    status: color_status(status_name(&component.status)),
                    message: component.message.unwrap_or_default(),
                })
                .collect();
            print_table(rows, "No components registered");
        }
    }

    Ok(())
}

fn status_name(status: &decision_lib::ComponentStatus) -> &'static str {
    match status {
        decision_lib::ComponentStatus::Healthy => "healthy",
        decision_lib::ComponentStatus::Degraded => "degraded",
        decision_lib::ComponentStatus::Unhealthy => "unhealthy",
    }
}
