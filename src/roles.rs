//! Hadoop daemon roles
//!
//! Each role is a table of [`BeanSpec`]s fed to the generic mapping engine.
//! Metric names follow the long-standing `<role>_<Attribute>` convention of
//! the Hadoop exporters so existing dashboards keep working.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::transformer::rules::{BeanSpec, FieldPath, FieldSpec, RoleConfig};

/// Default JournalNode cluster name (bean-name suffix)
pub const DEFAULT_CLUSTER_NAME: &str = "hadoop-cluster";

const MEMORY_BEAN: &str = "java.lang:type=Memory";

/// Hadoop daemon role being monitored
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// HDFS NameNode (metadata node)
    #[default]
    #[value(name = "namenode")]
    NameNode,
    /// HDFS DataNode (block storage node)
    #[value(name = "datanode")]
    DataNode,
    /// HDFS JournalNode (edit-log node)
    #[value(name = "journalnode")]
    JournalNode,
}

impl Role {
    /// Metric namespace
    pub fn namespace(&self) -> &'static str {
        match self {
            Role::NameNode => "namenode",
            Role::DataNode => "datanode",
            Role::JournalNode => "journalnode",
        }
    }

    /// Default `/jmx` URL for a daemon on localhost
    pub fn default_jmx_url(&self) -> &'static str {
        match self {
            Role::NameNode => "http://localhost:50070/jmx",
            Role::DataNode => "http://localhost:50075/jmx",
            Role::JournalNode => "http://localhost:8480/jmx",
        }
    }

    /// Service name used in Hadoop bean names
    fn service(&self) -> &'static str {
        match self {
            Role::NameNode => "NameNode",
            Role::DataNode => "DataNode",
            Role::JournalNode => "JournalNode",
        }
    }

    /// Build the mapping table for this role
    ///
    /// `cluster_name` is only used by the JournalNode, whose journal bean is
    /// named `Journal-<cluster_name>`.
    pub fn config(&self, url: &str, cluster_name: &str) -> RoleConfig {
        let primary = match self {
            Role::NameNode => namenode_fsnamesystem(),
            Role::DataNode => datanode_fsdataset(),
            Role::JournalNode => journalnode_journal(cluster_name),
        };

        RoleConfig::new(self.namespace(), url)
            .with_bean(primary)
            .with_bean(jvm_metrics(self.service()))
            .with_bean(heap_memory())
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.namespace())
    }
}

fn attr(name: &str) -> FieldPath {
    FieldPath::attribute(name)
}

fn namenode_fsnamesystem() -> BeanSpec {
    BeanSpec::new("Hadoop:service=NameNode,name=FSNamesystem").with_fields([
        FieldSpec::required("MissingBlocks", attr("MissingBlocks"))
            .with_help("Number of missing blocks"),
        FieldSpec::required("CapacityTotal", attr("CapacityTotal"))
            .with_help("Total raw capacity of DataNodes in bytes"),
        FieldSpec::required("CapacityUsed", attr("CapacityUsed"))
            .with_help("Used capacity across all DataNodes in bytes"),
        FieldSpec::required("CapacityRemaining", attr("CapacityRemaining"))
            .with_help("Remaining capacity in bytes"),
        FieldSpec::optional("CapacityUsedNonDFS", attr("CapacityUsedNonDFS"))
            .with_help("Capacity used by non-DFS files in bytes"),
        FieldSpec::required("BlocksTotal", attr("BlocksTotal"))
            .with_help("Current number of allocated blocks"),
        FieldSpec::required("FilesTotal", attr("FilesTotal"))
            .with_help("Current number of files and directories"),
        FieldSpec::optional("CorruptBlocks", attr("CorruptBlocks"))
            .with_help("Current number of blocks with corrupt replicas"),
        FieldSpec::optional("ExcessBlocks", attr("ExcessBlocks"))
            .with_help("Current number of excess blocks"),
        FieldSpec::optional("StaleDataNodes", attr("StaleDataNodes"))
            .with_help("Current number of DataNodes marked stale"),
        FieldSpec::optional("TotalSyncCount", attr("TotalSyncCount"))
            .with_help("Total number of edit log syncs"),
        FieldSpec::flag("isActive", attr("tag.HAState"), "active")
            .with_help("1 if this NameNode is the active HA NameNode, 0 otherwise"),
    ])
}

fn datanode_fsdataset() -> BeanSpec {
    BeanSpec::new("Hadoop:service=DataNode,name=FSDatasetState").with_fields([
        FieldSpec::required("Capacity", attr("Capacity")).with_help("Capacity in bytes"),
        FieldSpec::required("DfsUsed", attr("DfsUsed")).with_help("DFS used in bytes"),
        FieldSpec::required("Remaining", attr("Remaining")).with_help("Remaining in bytes"),
        FieldSpec::optional("NumFailedVolumes", attr("NumFailedVolumes"))
            .with_help("Number of failed volumes"),
        FieldSpec::optional("LastVolumeFailureDate", attr("LastVolumeFailureDate"))
            .with_help("Last volume failure time in milliseconds since epoch"),
        FieldSpec::optional(
            "EstimatedCapacityLostTotal",
            attr("EstimatedCapacityLostTotal"),
        )
        .with_help("Estimated capacity lost to volume failures in bytes"),
        FieldSpec::optional("CacheUsed", attr("CacheUsed")).with_help("Cache used in bytes"),
        FieldSpec::optional("CacheCapacity", attr("CacheCapacity"))
            .with_help("Cache capacity in bytes"),
    ])
}

fn journalnode_journal(cluster_name: &str) -> BeanSpec {
    BeanSpec::new(format!(
        "Hadoop:service=JournalNode,name=Journal-{}",
        cluster_name
    ))
    .with_fields([
        FieldSpec::optional("SyncsNumOps", attr("Syncs60sNumOps"))
            .with_help("Number of journal syncs in the last 60 seconds"),
        FieldSpec::optional("BatchesWritten", attr("BatchesWritten"))
            .with_help("Number of batches written"),
        FieldSpec::optional("TxnsWritten", attr("TxnsWritten"))
            .with_help("Number of transactions written"),
        FieldSpec::optional("BytesWritten", attr("BytesWritten"))
            .with_help("Number of bytes written"),
        FieldSpec::optional(
            "BatchesWrittenWhileLagging",
            attr("BatchesWrittenWhileLagging"),
        )
        .with_help("Number of batches written while lagging"),
        FieldSpec::required("LastWrittenTxId", attr("LastWrittenTxId"))
            .with_help("Highest transaction id written"),
        FieldSpec::optional("LastPromisedEpoch", attr("LastPromisedEpoch"))
            .with_help("Last promised epoch"),
        FieldSpec::optional("LastWriterEpoch", attr("LastWriterEpoch"))
            .with_help("Last writer epoch"),
        FieldSpec::optional("LastJournalTimestamp", attr("LastJournalTimestamp"))
            .with_help("Timestamp of the last journal write"),
        FieldSpec::optional("CurrentLagTxns", attr("CurrentLagTxns"))
            .with_help("Number of transactions this JournalNode is lagging"),
    ])
}

fn jvm_metrics(service: &str) -> BeanSpec {
    BeanSpec::new(format!("Hadoop:service={},name=JvmMetrics", service)).with_fields([
        FieldSpec::optional("GcCount", attr("GcCount")).with_help("Total GC count"),
        FieldSpec::optional("GcTimeMillis", attr("GcTimeMillis"))
            .with_help("Total GC time in milliseconds"),
        FieldSpec::optional("ThreadsRunnable", attr("ThreadsRunnable"))
            .with_help("Number of threads in RUNNABLE state"),
        FieldSpec::optional("ThreadsBlocked", attr("ThreadsBlocked"))
            .with_help("Number of threads in BLOCKED state"),
        FieldSpec::optional("ThreadsWaiting", attr("ThreadsWaiting"))
            .with_help("Number of threads in WAITING state"),
        FieldSpec::optional("ThreadsTimedWaiting", attr("ThreadsTimedWaiting"))
            .with_help("Number of threads in TIMED_WAITING state"),
    ])
}

fn heap_memory() -> BeanSpec {
    let heap = |metric: &str, key: &str, help: &str| {
        FieldSpec::optional(metric, FieldPath::nested("HeapMemoryUsage", key)).with_help(help)
    };

    BeanSpec::new(MEMORY_BEAN).with_fields([
        heap(
            "heapMemoryUsageCommitted",
            "committed",
            "Committed heap memory in bytes",
        ),
        heap("heapMemoryUsageInit", "init", "Initial heap memory in bytes"),
        heap("heapMemoryUsageMax", "max", "Maximum heap memory in bytes"),
        heap("heapMemoryUsageUsed", "used", "Used heap memory in bytes"),
    ])
}
