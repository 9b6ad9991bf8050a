//! Transformation of JMX beans into Prometheus metrics
//!
//! - [`rules`] declares which bean attributes become which gauges
//! - [`engine`] applies a [`RoleConfig`] to one fetched document
//! - [`formatter`] renders samples in the text exposition format

pub mod engine;
pub mod formatter;
pub mod rules;

pub use engine::{extract, map_beans, MetricSnapshot};
pub use formatter::{PrometheusFormatter, PrometheusMetric};
pub use rules::{BeanSpec, FieldPath, FieldSpec, MetricType, Requirement, RoleConfig, ValueKind};
