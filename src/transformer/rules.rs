//! Declarative bean/field mapping rules
//!
//! A [`RoleConfig`] lists the beans a daemon role cares about and, for each
//! bean, which attributes become which gauges.
//!
//! # Example
//!
//! ```ignore
//! use hadoop_jmx_exporter::transformer::rules::{BeanSpec, FieldPath, FieldSpec, RoleConfig};
//!
//! let config = RoleConfig::new("namenode", "http://localhost:50070/jmx").with_bean(
//!     BeanSpec::new("Hadoop:service=NameNode,name=FSNamesystem")
//!         .with_field(FieldSpec::required("CapacityTotal", FieldPath::attribute("CapacityTotal")))
//!         .with_field(FieldSpec::flag("isActive", FieldPath::attribute("tag.HAState"), "active")),
//! );
//! ```

use serde::Serialize;

/// Metric type, as written on the `# TYPE` line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Point-in-time value that can go up and down
    #[default]
    Gauge,
    /// Monotonically increasing value
    Counter,
}

impl MetricType {
    /// Returns the Prometheus type string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
            MetricType::Counter => "counter",
        }
    }
}

/// Location of a value inside one bean record
///
/// Attribute keys are matched verbatim; a key such as `tag.HAState` is a single
/// attribute, not a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPath {
    /// Top-level attribute of the bean
    Attribute(String),
    /// Key of a composite attribute, e.g. `HeapMemoryUsage` -> `used`
    Nested { attribute: String, key: String },
}

impl FieldPath {
    /// Top-level attribute path
    pub fn attribute(name: impl Into<String>) -> Self {
        FieldPath::Attribute(name.into())
    }

    /// One-level nested path
    pub fn nested(attribute: impl Into<String>, key: impl Into<String>) -> Self {
        FieldPath::Nested {
            attribute: attribute.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldPath::Attribute(name) => write!(f, "{}", name),
            FieldPath::Nested { attribute, key } => write!(f, "{}/{}", attribute, key),
        }
    }
}

/// How the value at a [`FieldPath`] becomes a number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// JSON number, passed through unconverted
    Number,
    /// 1.0 when the value is a string equal to `expected`, 0.0 otherwise
    Flag { expected: String },
}

/// What happens when a field cannot be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    /// Fail the whole cycle
    Required,
    /// Leave the metric out of the snapshot
    Optional,
}

/// One attribute to export as a gauge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    /// Metric name, without the role namespace
    pub metric: String,
    /// Help text
    pub help: String,
    /// Where the value lives in the bean
    pub path: FieldPath,
    /// Value interpretation
    pub kind: ValueKind,
    /// Unresolved-field policy
    pub requirement: Requirement,
}

impl FieldSpec {
    fn new(metric: &str, path: FieldPath, kind: ValueKind, requirement: Requirement) -> Self {
        Self {
            metric: metric.to_string(),
            help: metric.to_string(),
            path,
            kind,
            requirement,
        }
    }

    /// Numeric field that must be present
    pub fn required(metric: &str, path: FieldPath) -> Self {
        Self::new(metric, path, ValueKind::Number, Requirement::Required)
    }

    /// Numeric field that may be absent
    pub fn optional(metric: &str, path: FieldPath) -> Self {
        Self::new(metric, path, ValueKind::Number, Requirement::Optional)
    }

    /// String-comparison field; always resolves, so it is never required
    pub fn flag(metric: &str, path: FieldPath, expected: &str) -> Self {
        Self::new(
            metric,
            path,
            ValueKind::Flag {
                expected: expected.to_string(),
            },
            Requirement::Optional,
        )
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Whether an unresolved value fails the cycle
    pub fn is_required(&self) -> bool {
        self.requirement == Requirement::Required
    }
}

/// One bean, matched by exact name, and the fields taken from it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeanSpec {
    /// Exact bean `name`
    pub name: String,
    /// Fields in exposition order
    pub fields: Vec<FieldSpec>,
}

impl BeanSpec {
    /// Create a bean spec with no fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Add several fields
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields.extend(fields);
        self
    }
}

/// Static description of what one daemon role exports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleConfig {
    /// Metric name prefix, e.g. `namenode`
    pub namespace: String,
    /// JMX servlet URL
    pub url: String,
    /// Beans in exposition order
    pub beans: Vec<BeanSpec>,
}

impl RoleConfig {
    /// Create a role config with no beans
    pub fn new(namespace: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            url: url.into(),
            beans: Vec::new(),
        }
    }

    /// Add a bean
    pub fn with_bean(mut self, bean: BeanSpec) -> Self {
        self.beans.push(bean);
        self
    }

    /// Exposed metric name for a field: `<namespace>_<metric>`
    pub fn qualified_name(&self, field: &FieldSpec) -> String {
        format!("{}_{}", self.namespace, field.metric)
    }

    /// Every declared field with its bean, in exposition order
    pub fn fields(&self) -> impl Iterator<Item = (&BeanSpec, &FieldSpec)> {
        self.beans
            .iter()
            .flat_map(|bean| bean.fields.iter().map(move |field| (bean, field)))
    }
}
