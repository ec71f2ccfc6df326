//! Decision Maker CLI
//!
//! A command-line tool for inspecting and driving a node's decision maker:
//! scheduling intents, scheduler telemetry, pod discovery and health.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{health, intents, metrics, pods};
use std::path::PathBuf;

/// Decision Maker CLI
#[derive(Parser)]
#[command(name = "dmctl")]
#[command(author, version, about = "CLI for the Decision Maker API", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via DM_API_URL env var or the
    /// config file; defaults to http://localhost:8080)
    #[arg(long, env = "DM_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage scheduling intents
    #[command(subcommand)]
    Intents(IntentsCommands),

    /// View or push scheduler telemetry
    #[command(subcommand)]
    Metrics(MetricsCommands),

    /// Show live pod to PID mappings
    Pods,

    /// Show service health and readiness
    Health,
}

#[derive(Subcommand)]
pub enum IntentsCommands {
    /// List stored per-process scheduling intents
    List,

    /// Submit pod-level intents from a JSON file
    Submit {
        /// File holding `{"intents": [...]}` or a bare intent list
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum MetricsCommands {
    /// Show the latest scheduler metrics snapshot
    Show,

    /// Push a metrics snapshot from a JSON file
    Push {
        /// File holding one metrics snapshot
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load()?;
    let api_url = config.resolve_api_url(cli.api_url.as_deref());
    let client = client::ApiClient::new(&api_url)?;

    match cli.command {
        Commands::Intents(intents_cmd) => match intents_cmd {
            IntentsCommands::List => intents::list_intents(&client, cli.format).await?,
            IntentsCommands::Submit { file } => {
                intents::submit_intents(&client, &file, cli.format).await?
            }
        },
        Commands::Metrics(metrics_cmd) => match metrics_cmd {
            MetricsCommands::Show => metrics::show_metrics(&client, cli.format).await?,
            MetricsCommands::Push { file } => {
                metrics::push_metrics(&client, &file, cli.format).await?
            }
        },
        Commands::Pods => pods::list_pods(&client, cli.format).await?,
        Commands::Health => health::show_health(&client, cli.format).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_intents_submit() {
        let cli = Cli::try_parse_from([
            "dmctl",
            "--api-url",
            "http://node-a:8080",
            "intents",
            "submit",
            "batch.json",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://node-a:8080"));
        match cli.command {
            Commands::Intents(IntentsCommands::Submit { file }) => {
                assert_eq!(file, PathBuf::from("batch.json"));
            }
            _ => panic!("expected intents submit"),
        }
    }

    #[test]
    fn test_parse_format_flag() {
        let cli = Cli::try_parse_from(["dmctl", "--format", "json", "metrics", "show"]).unwrap();
        assert_eq!(cli.format, output::OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Metrics(MetricsCommands::Show)));
    }

    #[test]
    fn test_submit_requires_file() {
        assert!(Cli::try_parse_from(["dmctl", "intents", "submit"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["dmctl", "--format", "yaml", "pods"]).is_err());
    }
}
