//! Prometheus Exposition Format output
//!
//! Renders samples in the text exposition format (version 0.0.4):
//!
//! ```text
//! # HELP <metric_name> <help_text>
//! # TYPE <metric_name> <type>
//! <metric_name>{<label1>="<value1>"} <value>
//! ```

use std::collections::BTreeMap;
use std::fmt::Write;

use super::rules::MetricType;

/// Content type of the text exposition format
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// One sample ready for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct PrometheusMetric {
    /// Metric name
    pub name: String,
    /// Metric type
    pub metric_type: MetricType,
    /// Help text
    pub help: Option<String>,
    /// Labels, kept sorted for deterministic output
    pub labels: BTreeMap<String, String>,
    /// Sample value
    pub value: f64,
}

impl PrometheusMetric {
    /// Create a gauge sample
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            metric_type: MetricType::Gauge,
            help: None,
            labels: BTreeMap::new(),
            value,
        }
    }

    /// Set the metric type
    pub fn with_type(mut self, metric_type: MetricType) -> Self {
        self.metric_type = metric_type;
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Prometheus text formatter
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusFormatter;

impl PrometheusFormatter {
    /// Create a new formatter
    pub fn new() -> Self {
        Self
    }

    /// Render samples
    ///
    /// Samples sharing a name are grouped under one HELP/TYPE header, in order of
    /// first appearance. The header comes from the first sample of each group.
    pub fn format(&self, metrics: &[PrometheusMetric]) -> String {
        let mut output = String::with_capacity(metrics.len() * 96);
        let mut families: Vec<(&str, Vec<&PrometheusMetric>)> = Vec::new();

        for metric in metrics {
            match families.iter_mut().find(|(name, _)| *name == metric.name) {
                Some((_, group)) => group.push(metric),
                None => families.push((metric.name.as_str(), vec![metric])),
            }
        }

        for (name, group) in families {
            let head = group[0];
            if let Some(help) = &head.help {
                let _ = writeln!(output, "# HELP {} {}", name, Self::escape_help(help));
            }
            let _ = writeln!(output, "# TYPE {} {}", name, head.metric_type.as_str());

            for metric in group {
                Self::write_sample(&mut output, metric);
            }
        }

        output
    }

    fn write_sample(output: &mut String, metric: &PrometheusMetric) {
        output.push_str(&metric.name);

        if !metric.labels.is_empty() {
            let pairs: Vec<String> = metric
                .labels
                .iter()
                .map(|(k, v)| format!("{}=\"{}\"", k, Self::escape_label_value(v)))
                .collect();
            output.push('{');
            output.push_str(&pairs.join(","));
            output.push('}');
        }

        output.push(' ');
        output.push_str(&Self::format_value(metric.value));
        output.push('\n');
    }

    /// Format a sample value
    ///
    /// Integral values below 2^53 print without a decimal point so byte
    /// counts stay exact; everything else uses Rust's shortest round-trip form.
    pub fn format_value(value: f64) -> String {
        if value.is_nan() {
            "NaN".to_string()
        } else if value.is_infinite() {
            if value.is_sign_positive() {
                "+Inf".to_string()
            } else {
                "-Inf".to_string()
            }
        } else if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
            format!("{}", value as i64)
        } else {
            format!("{}", value)
        }
    }

    /// Escape backslash and newline
    pub fn escape_help(help: &str) -> String {
        help.replace('\\', "\\\\").replace('\n', "\\n")
    }

    /// Escape backslash, double quote and newline
    pub fn escape_label_value(value: &str) -> String {
        value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }
}
