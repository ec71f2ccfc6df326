//! Service configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable naming an optional configuration file
pub const CONFIG_FILE_ENV: &str = "DM_CONFIG_FILE";

const MACHINE_ID_PATH: &str = "/etc/machine-id";

/// Decision maker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Node name from Kubernetes downward API
    #[serde(default = "default_node_name")]
    pub node_name: String,

    /// HTTP listen port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Process table root scanned for pods
    #[serde(default = "default_proc_root")]
    pub proc_root: PathBuf,

    /// Overrides the host identity attached to scheduler gauges
    #[serde(default)]
    pub machine_id: Option<String>,
}

fn default_node_name() -> String {
    std::env::var("NODE_NAME").unwrap_or_else(|_| "unknown".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_proc_root() -> PathBuf {
    PathBuf::from(decision_lib::discovery::DEFAULT_PROC_ROOT)
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            node_name: default_node_name(),
            api_port: default_api_port(),
            bind_address: default_bind_address(),
            proc_root: default_proc_root(),
            machine_id: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from `DM_*` environment variables and, when
    /// `DM_CONFIG_FILE` is set, the named file. Environment wins.
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            builder = builder.add_source(config::File::with_name(&path).required(true));
        }

        let config = builder
            .add_source(config::Environment::with_prefix("DM").try_parsing(true))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Invalid decision maker configuration")
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.api_port)
    }

    /// Host identity: configured override, then `/etc/machine-id`, then the
    /// host name
    pub fn resolve_machine_id(&self) -> String {
        if let Some(id) = self.machine_id.as_deref().filter(|id| !id.is_empty()) {
            return id.to_string();
        }

        std::fs::read_to_string(MACHINE_ID_PATH)
            .ok()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .or_else(|| {
                hostname::get()
                    .ok()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| self.node_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.proc_root, PathBuf::from("/proc"));
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
        assert!(config.machine_id.is_none());
    }

    #[test]
    fn test_machine_id_override() {
        let config = ServiceConfig {
            machine_id: Some("fixed-id".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_machine_id(), "fixed-id");
    }

    #[test]
    fn test_machine_id_fallback_is_not_empty() {
        let config = ServiceConfig {
            machine_id: Some(String::new()),
            ..Default::default()
        };
        assert!(!config.resolve_machine_id().is_empty());
    }

    #[test]
    fn test_deserialize_partial_source() {
        let config: ServiceConfig = config::Config::builder()
            .set_override("api_port", 9090)
            .unwrap()
            .set_override("proc_root", "/host/proc")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.api_port, 9090);
        assert_eq!(config.proc_root, PathBuf::from("/host/proc"));
        assert_eq!(config.bind_address, "0.0.0.0");
    }
}
