//! Configuration management for hadoop-jmx-exporter
//!
//! Handles loading and validating configuration from YAML files, and applying
//! command-line overrides on top.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::cli::Cli;
use crate::roles::{Role, DEFAULT_CLUSTER_NAME};
use crate::transformer::RoleConfig;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Error parsing the configuration file
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Daemon role being monitored
    #[serde(default)]
    pub role: Role,

    /// JMX endpoint configuration
    #[serde(default)]
    pub jmx: JmxConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// JMX endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JmxConfig {
    /// JMX servlet URL; defaults to the role's usual localhost port
    #[serde(default)]
    pub url: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// Cluster name, used by the JournalNode bean name
    #[serde(default = "default_cluster_name")]
    pub cluster_name: String,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Metrics endpoint path
    #[serde(default = "default_metrics_path")]
    pub path: String,

    /// Server bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Keep serving the last good values when a cycle fails
    #[serde(default = "default_serve_stale")]
    pub serve_stale_on_failure: bool,
}

// Default value functions
fn default_timeout() -> u64 {
    5000
}

fn default_cluster_name() -> String {
    DEFAULT_CLUSTER_NAME.to_string()
}

fn default_port() -> u16 {
    9070
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_serve_stale() -> bool {
    true
}

impl Default for JmxConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: default_timeout(),
            cluster_name: default_cluster_name(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            path: default_metrics_path(),
            bind_address: default_bind_address(),
            serve_stale_on_failure: default_serve_stale(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// Not validated here: CLI and env overrides are applied on top first, so
    /// call [`Config::validate`] once the final values are known.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a YAML file, falling back to defaults if not found
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        Self::load(path)
    }

    /// Apply command-line (and environment) overrides
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(role) = cli.role {
            self.role = role;
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(ref bind_address) = cli.bind_address {
            self.server.bind_address = bind_address.clone();
        }
        if let Some(ref path) = cli.metrics_path {
            self.server.path = path.clone();
        }
        if let Some(ref url) = cli.jmx_url {
            self.jmx.url = Some(url.clone());
        }
        if let Some(timeout) = cli.jmx_timeout {
            self.jmx.timeout_ms = timeout;
        }
        if let Some(ref cluster_name) = cli.cluster_name {
            self.jmx.cluster_name = cluster_name.clone();
        }
    }

    /// Effective JMX URL
    pub fn jmx_url(&self) -> &str {
        self.jmx
            .url
            .as_deref()
            .unwrap_or_else(|| self.role.default_jmx_url())
    }

    /// Mapping table for the configured role
    pub fn role_config(&self) -> RoleConfig {
        self.role.config(self.jmx_url(), &self.jmx.cluster_name)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if !self.server.path.starts_with('/') {
            return Err(ConfigError::ValidationError(
                "Metrics path must start with '/'".to_string(),
            ));
        }

        if self.server.path == "/" || self.server.path == "/health" {
            return Err(ConfigError::ValidationError(format!(
                "Metrics path '{}' conflicts with a built-in route",
                self.server.path
            )));
        }

        if self.jmx.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "JMX timeout must be greater than 0".to_string(),
            ));
        }

        let url = url::Url::parse(self.jmx_url()).map_err(|e| {
            ConfigError::ValidationError(format!("Invalid JMX URL '{}': {}", self.jmx_url(), e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "JMX URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.role == Role::JournalNode && self.jmx.cluster_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Cluster name is required for the journalnode role".to_string(),
            ));
        }

        Ok(())
    }
}
