//! CLI argument parsing for hadoop-jmx-exporter
//!
//! # Options
//!
//! - `--config` / `-c`: Configuration file path (default: config.yaml, env: HADOOP_EXPORTER_CONFIG)
//! - `--role` / `-r`: Daemon role: namenode, datanode, journalnode (env: HADOOP_EXPORTER_ROLE)
//! - `--port` / `-p`: Server port (env: HADOOP_EXPORTER_PORT)
//! - `--bind-address`: Server bind address (env: HADOOP_EXPORTER_BIND_ADDRESS)
//! - `--metrics-path`: Metrics endpoint path (env: HADOOP_EXPORTER_METRICS_PATH)
//! - `--jmx-url`: JMX servlet URL (env: HADOOP_EXPORTER_JMX_URL)
//! - `--jmx-timeout`: HTTP timeout in milliseconds (env: HADOOP_EXPORTER_JMX_TIMEOUT)
//! - `--cluster-name`: JournalNode cluster name (env: HADOOP_EXPORTER_CLUSTER_NAME)
//! - `--validate`: Validate configuration without starting server
//! - `--dry-run`: Print the resolved bean/field table
//! - `--log-level` / `-l`: Log level (env: HADOOP_EXPORTER_LOG_LEVEL)
//! - `--log-format`: Log output format, text or json (env: HADOOP_EXPORTER_LOG_FORMAT)
//! - `--output-format`: Output format for the --dry-run table (text/json/yaml)
//!
//! # Precedence
//!
//! 1. CLI arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::roles::Role;

/// hadoop-jmx-exporter - Prometheus exporter for Hadoop daemons
///
/// Scrapes the `/jmx` servlet of a NameNode, DataNode or JournalNode and
/// exposes a fixed set of gauges in Prometheus format.
#[derive(Parser, Debug)]
#[command(name = "hadoop-jmx-exporter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config.yaml",
        env = "HADOOP_EXPORTER_CONFIG"
    )]
    pub config: PathBuf,

    /// Daemon role to monitor (overrides config file)
    #[arg(short, long, value_enum, env = "HADOOP_EXPORTER_ROLE")]
    pub role: Option<Role>,

    /// Server port (overrides config file)
    #[arg(short, long, value_name = "PORT", env = "HADOOP_EXPORTER_PORT")]
    pub port: Option<u16>,

    /// Server bind address (overrides config file)
    #[arg(long, value_name = "ADDRESS", env = "HADOOP_EXPORTER_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Metrics endpoint path (overrides config file)
    #[arg(long, value_name = "PATH", env = "HADOOP_EXPORTER_METRICS_PATH")]
    pub metrics_path: Option<String>,

    /// JMX servlet URL (overrides config file)
    #[arg(long, value_name = "URL", env = "HADOOP_EXPORTER_JMX_URL")]
    pub jmx_url: Option<String>,

    /// JMX HTTP timeout in milliseconds (overrides config file)
    #[arg(long, value_name = "MS", env = "HADOOP_EXPORTER_JMX_TIMEOUT")]
    pub jmx_timeout: Option<u64>,

    /// JournalNode cluster name (overrides config file)
    #[arg(long, value_name = "NAME", env = "HADOOP_EXPORTER_CLUSTER_NAME")]
    pub cluster_name: Option<String>,

    /// Validate configuration without starting server
    #[arg(long)]
    pub validate: bool,

    /// Print the resolved bean/field table and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Log level
    #[arg(
        short,
        long,
        value_enum,
        default_value = "info",
        env = "HADOOP_EXPORTER_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", env = "HADOOP_EXPORTER_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Output format for --dry-run
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Trace level - most verbose
    Trace,
    /// Debug level
    Debug,
    /// Info level - default
    Info,
    /// Warn level
    Warn,
    /// Error level - least verbose
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Log output format
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

/// Output format options for dry-run mode
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(LogLevel::Info.to_string(), "info");
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Text.to_string(), "text");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Yaml.to_string(), "yaml");
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["hadoop-jmx-exporter"]);
        assert_eq!(cli.config, PathBuf::from("config.yaml"));
        assert_eq!(cli.role, None);
        assert_eq!(cli.port, None);
        assert_eq!(cli.jmx_url, None);
        assert_eq!(cli.jmx_timeout, None);
        assert_eq!(cli.cluster_name, None);
        assert!(!cli.validate);
        assert!(!cli.dry_run);
        assert_eq!(cli.log_level, LogLevel::Info);
        assert_eq!(cli.log_format, LogFormat::Text);
        assert_eq!(cli.output_format, OutputFormat::Text);
    }

    #[test]
    fn test_cli_role_values() {
        for (arg, role) in [
            ("namenode", Role::NameNode),
            ("datanode", Role::DataNode),
            ("journalnode", Role::JournalNode),
        ] {
            let cli = Cli::parse_from(["hadoop-jmx-exporter", "--role", arg]);
            assert_eq!(cli.role, Some(role));
        }

        assert!(Cli::try_parse_from(["hadoop-jmx-exporter", "--role", "secondary"]).is_err());
    }

    #[test]
    fn test_cli_with_options() {
        let cli = Cli::parse_from([
            "hadoop-jmx-exporter",
            "-c",
            "custom.yaml",
            "-r",
            "journalnode",
            "--cluster-name",
            "prod",
            "-p",
            "9170",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "--validate",
        ]);
        assert_eq!(cli.config, PathBuf::from("custom.yaml"));
        assert_eq!(cli.role, Some(Role::JournalNode));
        assert_eq!(cli.cluster_name, Some("prod".to_string()));
        assert_eq!(cli.port, Some(9170));
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(cli.validate);
    }

    #[test]
    fn test_cli_dry_run() {
        let cli = Cli::parse_from(["hadoop-jmx-exporter", "--dry-run", "--output-format", "yaml"]);
        assert!(cli.dry_run);
        assert_eq!(cli.output_format, OutputFormat::Yaml);
    }
}
