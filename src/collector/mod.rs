//! Hadoop JMX collection
//!
//! Fetches the `/jmx` servlet of one daemon and maps it onto the role's
//! metric table.
//!
//! # Example
//!
//! ```ignore
//! use hadoop_jmx_exporter::collector::Collector;
//! use hadoop_jmx_exporter::roles::Role;
//!
//! let config = Role::NameNode.config("http://localhost:50070/jmx", "hadoop-cluster");
//! let collector = Collector::new(config, 5000)?;
//! let snapshot = collector.collect().await?;
//! ```

mod client;
mod parser;

pub use client::{FetchResult, JmxClient};
pub use parser::{Bean, BeanIndex, MapResult};

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::ScrapeError;
use crate::transformer::{extract, MetricSnapshot, RoleConfig};

/// One collection pipeline: fetch, then map
///
/// Holds no mutable state; concurrent `collect` calls are independent.
#[derive(Clone)]
pub struct Collector {
    client: JmxClient,
    config: Arc<RoleConfig>,
}

impl Collector {
    /// Create a collector fetching `config.url`
    pub fn new(config: RoleConfig, timeout_ms: u64) -> FetchResult<Self> {
        let client = JmxClient::new(&config.url, timeout_ms)?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Run one collection cycle
    #[instrument(skip(self), fields(role = %self.config.namespace))]
    pub async fn collect(&self) -> Result<MetricSnapshot, ScrapeError> {
        let body = self.client.fetch().await?;
        let snapshot = extract(&body, &self.config)?;
        debug!(metrics = snapshot.len(), "Mapped JMX document");
        Ok(snapshot)
    }

    /// Client reference
    pub fn client(&self) -> &JmxClient {
        &self.client
    }
}
