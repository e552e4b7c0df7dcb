use crate::error::ExporterError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub openvpn: OpenVpnConfig,
    #[serde(default, alias = "configs")]
    pub sources: Vec<StatusSourceConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_telemetry_path")]
    pub telemetry_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenVpnConfig {
    /// Export per-common-name series only, without per-session labels
    #[serde(default = "default_true")]
    pub ignore_individuals: bool,
}

/// One OpenVPN status file to scrape
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StatusSourceConfig {
    pub name: String,
    #[serde(alias = "logfile")]
    pub path: String,
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9176
}

fn default_telemetry_path() -> String {
    "/metrics".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
            telemetry_path: default_telemetry_path(),
        }
    }
}

impl Default for OpenVpnConfig {
    fn default() -> Self {
        Self {
            ignore_individuals: default_true(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("OPENVPN_EXPORTER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants serde cannot express
    pub fn validate(&self) -> std::result::Result<(), ExporterError> {
        let telemetry_path = self.server.telemetry_path.as_str();
        if !telemetry_path.starts_with('/') || telemetry_path == "/" || telemetry_path == "/health"
        {
            return Err(ExporterError::Config(format!(
                "telemetry_path must start with '/' and not clash with / or /health, got {:?}",
                telemetry_path
            )));
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            if source.name.is_empty() {
                return Err(ExporterError::Config("source name is required".to_string()));
            }
            if source.path.is_empty() {
                return Err(ExporterError::Config(format!(
                    "source {}: path is required",
                    source.name
                )));
            }
            if !names.insert(source.name.as_str()) {
                return Err(ExporterError::Config(format!(
                    "duplicate source name: {}",
                    source.name
                )));
            }
        }

        Ok(())
    }
}
