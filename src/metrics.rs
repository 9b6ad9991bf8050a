//! Gauge registry for hadoop-jmx-exporter
//!
//! [`GaugeRegistry`] is built once at startup from a [`RoleConfig`] and handed
//! the result of every collection cycle. It keeps the last successfully
//! published [`MetricSnapshot`], so a failed cycle never replaces good values
//! with zeros.
//!
//! # Metrics
//!
//! ## Role gauges
//! One gauge per declared field, e.g. `namenode_CapacityTotal`. A gauge is only
//! rendered when the last successful snapshot contains it.
//!
//! ## Exporter metrics
//! - `hadoop_exporter_up{role}` - 1 if the last cycle succeeded
//! - `hadoop_exporter_scrapes_total{role}` - Counter of collection cycles
//! - `hadoop_exporter_scrape_failures_total{role,kind}` - Counter of failed cycles
//! - `hadoop_exporter_scrape_duration_seconds{role}` - Duration of the last cycle
//! - `hadoop_exporter_last_success_timestamp_seconds{role}` - Time of the last success
//! - `hadoop_exporter_info{role,version}` - Build information

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ScrapeError;
use crate::transformer::{MetricSnapshot, MetricType, PrometheusFormatter, PrometheusMetric, RoleConfig};

/// Failure kinds, in rendering order
const FAILURE_KINDS: [&str; 3] = ["fetch", "malformed", "missing_field"];

/// Thread-safe counter using atomic operations
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    /// Create a new counter initialized to 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter by 1
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current value
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Thread-safe gauge using atomic operations
#[derive(Debug, Default)]
pub struct Gauge {
    /// Stored as bits of f64 for atomic operations
    value: AtomicU64,
}

impl Gauge {
    /// Create a new gauge initialized to 0
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0.0_f64.to_bits()),
        }
    }

    /// Set the gauge to a specific value
    pub fn set(&self, v: f64) {
        self.value.store(v.to_bits(), Ordering::Relaxed);
    }

    /// Get the current value
    pub fn get(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Relaxed))
    }

    /// Set the gauge to the current Unix timestamp
    pub fn set_to_current_time(&self) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        self.set(timestamp);
    }
}

/// Declared role gauge
#[derive(Debug, Clone)]
struct GaugeDesc {
    name: String,
    help: String,
}

/// Exporter self-observability
#[derive(Debug, Default)]
struct ExporterMetrics {
    up: Gauge,
    scrapes_total: Counter,
    failures: [Counter; 3],
    scrape_duration_seconds: Gauge,
    last_success_timestamp: Gauge,
}

/// Published values and the newest cycle that has completed
#[derive(Debug, Default)]
struct Published {
    completed: u64,
    snapshot: Option<MetricSnapshot>,
}

/// Registry of role gauges and exporter metrics
///
/// Cheap to clone; clones share state. Cycles are numbered by
/// [`GaugeRegistry::begin_cycle`]; a cycle that completes after a newer one
/// does not overwrite the newer result.
#[derive(Debug, Clone)]
pub struct GaugeRegistry {
    role: String,
    gauges: Arc<Vec<GaugeDesc>>,
    cycles: Arc<AtomicU64>,
    published: Arc<RwLock<Published>>,
    exporter: Arc<ExporterMetrics>,
}

impl GaugeRegistry {
    /// Declare one gauge per field of `config`
    pub fn new(config: &RoleConfig) -> Self {
        let gauges = config
            .fields()
            .map(|(_, field)| GaugeDesc {
                name: config.qualified_name(field),
                help: field.help.clone(),
            })
            .collect();

        Self {
            role: config.namespace.clone(),
            gauges: Arc::new(gauges),
            cycles: Arc::new(AtomicU64::new(0)),
            published: Arc::new(RwLock::new(Published::default())),
            exporter: Arc::new(ExporterMetrics::default()),
        }
    }

    /// Number a new collection cycle, in start order
    pub fn begin_cycle(&self) -> u64 {
        self.cycles.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Replace the published values with the snapshot of `cycle`
    ///
    /// Returns `false` and leaves everything but the scrape counter untouched
    /// when a newer cycle has already completed.
    pub fn publish(
        &self,
        cycle: u64,
        snapshot: MetricSnapshot,
        duration_seconds: f64,
    ) -> bool {
        self.exporter.scrapes_total.inc();

        let mut published = self
            .published
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if cycle < published.completed {
            tracing::debug!(
                cycle,
                newest = published.completed,
                "Discarding snapshot of an older cycle"
            );
            return false;
        }
        published.completed = cycle;
        published.snapshot = Some(snapshot);

        self.exporter.up.set(1.0);
        self.exporter.scrape_duration_seconds.set(duration_seconds);
        self.exporter.last_success_timestamp.set_to_current_time();
        true
    }

    /// Record a failed cycle; published values are left untouched
    ///
    /// The failure is always counted, but `up` only drops when no newer cycle
    /// has completed.
    pub fn record_failure(&self, cycle: u64, error: &ScrapeError, duration_seconds: f64) {
        self.exporter.scrapes_total.inc();
        if let Some(slot) = FAILURE_KINDS.iter().position(|k| *k == error.kind()) {
            self.exporter.failures[slot].inc();
        }

        let mut published = self
            .published
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if cycle < published.completed {
            return;
        }
        published.completed = cycle;

        self.exporter.up.set(0.0);
        self.exporter.scrape_duration_seconds.set(duration_seconds);
    }

    /// Last successfully published snapshot
    pub fn last_snapshot(&self) -> Option<MetricSnapshot> {
        self.published
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .snapshot
            .clone()
    }

    /// Whether the last cycle succeeded
    pub fn is_up(&self) -> bool {
        self.exporter.up.get() == 1.0
    }

    /// Failed cycles of one kind
    pub fn failures(&self, kind: &str) -> u64 {
        FAILURE_KINDS
            .iter()
            .position(|k| *k == kind)
            .map(|slot| self.exporter.failures[slot].get())
            .unwrap_or(0)
    }

    /// Current samples: role gauges in declaration order, then exporter metrics
    pub fn to_prometheus_metrics(&self) -> Vec<PrometheusMetric> {
        let mut metrics = Vec::with_capacity(self.gauges.len() + 8);

        if let Some(snapshot) = self.last_snapshot() {
            for gauge in self.gauges.iter() {
                if let Some(value) = snapshot.get(&gauge.name) {
                    metrics.push(PrometheusMetric::new(&gauge.name, value).with_help(&gauge.help));
                }
            }
        }

        let exporter = &self.exporter;
        let role = self.role.as_str();

        metrics.push(
            PrometheusMetric::new("hadoop_exporter_up", exporter.up.get())
                .with_help("Whether the last collection cycle succeeded")
                .with_label("role", role),
        );
        metrics.push(
            PrometheusMetric::new(
                "hadoop_exporter_scrapes_total",
                exporter.scrapes_total.get() as f64,
            )
            .with_type(MetricType::Counter)
            .with_help("Total collection cycles")
            .with_label("role", role),
        );
        for (slot, kind) in FAILURE_KINDS.iter().enumerate() {
            metrics.push(
                PrometheusMetric::new(
                    "hadoop_exporter_scrape_failures_total",
                    exporter.failures[slot].get() as f64,
                )
                .with_type(MetricType::Counter)
                .with_help("Failed collection cycles by failure kind")
                .with_label("role", role)
                .with_label("kind", *kind),
            );
        }
        metrics.push(
            PrometheusMetric::new(
                "hadoop_exporter_scrape_duration_seconds",
                exporter.scrape_duration_seconds.get(),
            )
            .with_help("Duration of the last collection cycle")
            .with_label("role", role),
        );
        metrics.push(
            PrometheusMetric::new(
                "hadoop_exporter_last_success_timestamp_seconds",
                exporter.last_success_timestamp.get(),
            )
            .with_help("Unix time of the last successful collection cycle")
            .with_label("role", role),
        );
        metrics.push(
            PrometheusMetric::new("hadoop_exporter_info", 1.0)
                .with_help("hadoop-jmx-exporter build information")
                .with_label("role", role)
                .with_label("version", env!("CARGO_PKG_VERSION")),
        );

        metrics
    }

    /// Render everything in the text exposition format
    pub fn render(&self) -> String {
        PrometheusFormatter::new().format(&self.to_prometheus_metrics())
    }
}
