//! hadoop-jmx-exporter - Prometheus exporter for Hadoop daemons
//!
//! This binary serves a Prometheus-compatible metrics endpoint backed by the
//! `/jmx` servlet of a NameNode, DataNode or JournalNode.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use hadoop_jmx_exporter::cli::{Cli, OutputFormat};
use hadoop_jmx_exporter::config::Config;
use hadoop_jmx_exporter::server;
use hadoop_jmx_exporter::transformer::{RoleConfig, ValueKind};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    hadoop_jmx_exporter::init_logging(&cli.log_level.to_string(), cli.log_format)?;

    let mut config = Config::load_or_default(&cli.config)?;
    config.apply_cli(&cli);
    config.validate()?;

    if cli.validate {
        println!("Configuration is valid");
        return Ok(());
    }

    if cli.dry_run {
        print!("{}", render_plan(&config.role_config(), cli.output_format)?);
        return Ok(());
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        role = %config.role,
        jmx_url = %config.jmx_url(),
        "Starting hadoop-jmx-exporter"
    );

    server::run(config).await?;

    Ok(())
}

/// Describe which beans and fields will be scraped
fn render_plan(role_config: &RoleConfig, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(role_config)? + "\n",
        OutputFormat::Yaml => serde_yaml::to_string(role_config)?,
        OutputFormat::Text => {
            let mut out = format!(
                "Role: {}\nJMX URL: {}\n",
                role_config.namespace, role_config.url
            );
            for bean in &role_config.beans {
                out.push_str(&format!("\nBean: {}\n", bean.name));
                for field in &bean.fields {
                    let kind = match &field.kind {
                        ValueKind::Number => "number".to_string(),
                        ValueKind::Flag { expected } => format!("flag == \"{}\"", expected),
                    };
                    out.push_str(&format!(
                        "  {:<48} {:<32} {:<8} {}\n",
                        role_config.qualified_name(field),
                        field.path.to_string(),
                        format!("{:?}", field.requirement).to_lowercase(),
                        kind
                    ));
                }
            }
            out
        }
    };

    Ok(rendered)
}
