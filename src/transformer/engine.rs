//! Mapping engine - JMX beans to gauge values
//!
//! [`extract`] turns one raw `/jmx` body into a [`MetricSnapshot`] for a
//! [`RoleConfig`]. A snapshot is either complete (every required field
//! resolved) or the call fails; partial snapshots are never returned.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::collector::{Bean, BeanIndex, MapResult};
use crate::error::MapError;

use super::rules::{FieldPath, FieldSpec, RoleConfig, ValueKind};

/// Current values of one collection cycle, keyed by qualified metric name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSnapshot {
    values: BTreeMap<String, f64>,
}

impl MetricSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a metric value
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Value of a metric, if it was resolved
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Whether a metric was resolved
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of resolved metrics
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was resolved
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Map a raw `/jmx` body onto the metrics declared by `config`
///
/// # Errors
/// - [`MapError::Malformed`] if the body is not a `{"beans": [...]}` document
/// - [`MapError::MissingRequiredField`] for the first required field that is
///   absent or not a number
pub fn extract(body: &[u8], config: &RoleConfig) -> MapResult<MetricSnapshot> {
    let index = BeanIndex::parse(body)?;
    map_beans(&index, config)
}

/// Map an already-parsed bean index onto the metrics declared by `config`
pub fn map_beans(index: &BeanIndex, config: &RoleConfig) -> MapResult<MetricSnapshot> {
    let mut snapshot = MetricSnapshot::new();

    for bean_spec in &config.beans {
        let bean = index.get(&bean_spec.name);
        if bean.is_none() {
            tracing::debug!(bean = %bean_spec.name, "Bean not present in document");
        }

        for field in &bean_spec.fields {
            let name = config.qualified_name(field);
            match resolve(bean, field) {
                Some(value) => snapshot.insert(name, value),
                None if field.is_required() => {
                    return Err(MapError::MissingRequiredField {
                        metric: name,
                        bean: bean_spec.name.clone(),
                    });
                }
                None => {
                    tracing::debug!(
                        bean = %bean_spec.name,
                        path = %field.path,
                        metric = %name,
                        "Optional field unresolved, omitting"
                    );
                }
            }
        }
    }

    Ok(snapshot)
}

/// Resolve one field against a bean, `None` when unresolved
fn resolve(bean: Option<&Bean>, field: &FieldSpec) -> Option<f64> {
    let value = bean.and_then(|b| lookup(b, &field.path));

    match &field.kind {
        ValueKind::Number => match value {
            Some(Value::Number(n)) => n.as_f64(),
            _ => None,
        },
        ValueKind::Flag { expected } => {
            let matched = matches!(value, Some(Value::String(s)) if s == expected);
            Some(if matched { 1.0 } else { 0.0 })
        }
    }
}

fn lookup<'a>(bean: &'a Bean, path: &FieldPath) -> Option<&'a Value> {
    match path {
        FieldPath::Attribute(name) => bean.get(name),
        FieldPath::Nested { attribute, key } => match bean.get(attribute) {
            Some(Value::Object(inner)) => inner.get(key),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::rules::BeanSpec;
    use serde_json::json;

    const FS: &str = "Hadoop:service=NameNode,name=FSNamesystem";
    const MEMORY: &str = "java.lang:type=Memory";

    fn test_config() -> RoleConfig {
        RoleConfig::new("namenode", "http://localhost:50070/jmx")
            .with_bean(
                BeanSpec::new(FS)
                    .with_field(FieldSpec::required(
                        "CapacityTotal",
                        FieldPath::attribute("CapacityTotal"),
                    ))
                    .with_field(FieldSpec::optional(
                        "CorruptBlocks",
                        FieldPath::attribute("CorruptBlocks"),
                    ))
                    .with_field(FieldSpec::flag(
                        "isActive",
                        FieldPath::attribute("tag.HAState"),
                        "active",
                    )),
            )
            .with_bean(BeanSpec::new(MEMORY).with_field(FieldSpec::optional(
                "heapMemoryUsageUsed",
                FieldPath::nested("HeapMemoryUsage", "used"),
            )))
    }

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_extract_complete_document() {
        let doc = body(json!({
            "beans": [
                {"name": FS, "CapacityTotal": 1000, "CorruptBlocks": 3, "tag.HAState": "active"},
                {"name": MEMORY, "HeapMemoryUsage": {"used": 512, "max": 2048}}
            ]
        }));

        let snapshot = extract(&doc, &test_config()).unwrap();
        assert_eq!(snapshot.len(), 4);
        assert_eq!(snapshot.get("namenode_CapacityTotal"), Some(1000.0));
        assert_eq!(snapshot.get("namenode_CorruptBlocks"), Some(3.0));
        assert_eq!(snapshot.get("namenode_isActive"), Some(1.0));
        assert_eq!(snapshot.get("namenode_heapMemoryUsageUsed"), Some(512.0));
    }

    #[test]
    fn test_duplicate_beans_use_last_entry() {
        let doc = body(json!({
            "beans": [
                {"name": FS, "CapacityTotal": 1, "tag.HAState": "active"},
                {"name": FS, "CapacityTotal": 2, "tag.HAState": "standby"}
            ]
        }));

        let snapshot = extract(&doc, &test_config()).unwrap();
        assert_eq!(snapshot.get("namenode_CapacityTotal"), Some(2.0));
        assert_eq!(snapshot.get("namenode_isActive"), Some(0.0));
    }

    #[test]
    fn test_missing_required_field_fails() {
        let doc = body(json!({"beans": [{"name": FS, "CorruptBlocks": 3}]}));

        let err = extract(&doc, &test_config()).unwrap_err();
        assert_eq!(
            err,
            MapError::MissingRequiredField {
                metric: "namenode_CapacityTotal".to_string(),
                bean: FS.to_string(),
            }
        );
    }

    #[test]
    fn test_required_field_with_wrong_type_fails() {
        let doc = body(json!({"beans": [{"name": FS, "CapacityTotal": "1000"}]}));

        let err = extract(&doc, &test_config()).unwrap_err();
        assert_eq!(err.field(), Some("namenode_CapacityTotal"));
    }

    #[test]
    fn test_missing_bean_fails_required_field() {
        let doc = body(json!({"beans": [{"name": MEMORY, "HeapMemoryUsage": {"used": 1}}]}));

        let err = extract(&doc, &test_config()).unwrap_err();
        assert_eq!(err.field(), Some("namenode_CapacityTotal"));
    }

    #[test]
    fn test_missing_optional_field_is_omitted() {
        let doc = body(json!({
            "beans": [
                {"name": FS, "CapacityTotal": 1000},
                {"name": MEMORY, "HeapMemoryUsage": {"used": 512}}
            ]
        }));

        let snapshot = extract(&doc, &test_config()).unwrap();
        assert!(!snapshot.contains("namenode_CorruptBlocks"));
        assert_eq!(snapshot.get("namenode_CapacityTotal"), Some(1000.0));
        assert_eq!(snapshot.get("namenode_heapMemoryUsageUsed"), Some(512.0));
    }

    #[test]
    fn test_missing_optional_bean_is_omitted() {
        let doc = body(json!({"beans": [{"name": FS, "CapacityTotal": 1000}]}));

        let snapshot = extract(&doc, &test_config()).unwrap();
        assert!(!snapshot.contains("namenode_heapMemoryUsageUsed"));
    }

    #[test]
    fn test_nested_path_requires_object() {
        let doc = body(json!({
            "beans": [
                {"name": FS, "CapacityTotal": 1000},
                {"name": MEMORY, "HeapMemoryUsage": 512}
            ]
        }));

        let snapshot = extract(&doc, &test_config()).unwrap();
        assert!(!snapshot.contains("namenode_heapMemoryUsageUsed"));
    }

    #[test]
    fn test_flag_values() {
        let cases = [
            (json!("active"), 1.0),
            (json!("standby"), 0.0),
            (json!("ACTIVE"), 0.0),
            (json!(1), 0.0),
            (json!(null), 0.0),
            (json!(true), 0.0),
        ];

        for (tag, expected) in cases {
            let doc = body(json!({"beans": [{"name": FS, "CapacityTotal": 1, "tag.HAState": tag.clone()}]}));
            let snapshot = extract(&doc, &test_config()).unwrap();
            assert_eq!(snapshot.get("namenode_isActive"), Some(expected), "tag {}", tag);
        }
    }

    #[test]
    fn test_flag_absent_tag_is_zero() {
        let doc = body(json!({"beans": [{"name": FS, "CapacityTotal": 1}]}));
        let snapshot = extract(&doc, &test_config()).unwrap();
        assert_eq!(snapshot.get("namenode_isActive"), Some(0.0));
    }

    #[test]
    fn test_flag_absent_bean_is_zero() {
        let config = RoleConfig::new("namenode", "http://localhost:50070/jmx").with_bean(
            BeanSpec::new(FS).with_field(FieldSpec::flag(
                "isActive",
                FieldPath::attribute("tag.HAState"),
                "active",
            )),
        );

        let snapshot = extract(br#"{"beans": []}"#, &config).unwrap();
        assert_eq!(snapshot.get("namenode_isActive"), Some(0.0));
    }

    #[test]
    fn test_dotted_attribute_is_not_split() {
        let doc = body(json!({
            "beans": [{"name": FS, "CapacityTotal": 1, "tag": {"HAState": "active"}}]
        }));
        let snapshot = extract(&doc, &test_config()).unwrap();
        assert_eq!(snapshot.get("namenode_isActive"), Some(0.0));
    }

    #[test]
    fn test_values_are_not_converted() {
        let doc = body(json!({
            "beans": [{"name": FS, "CapacityTotal": 1.5e15, "CorruptBlocks": -1}]
        }));
        let snapshot = extract(&doc, &test_config()).unwrap();
        assert_eq!(snapshot.get("namenode_CapacityTotal"), Some(1.5e15));
        assert_eq!(snapshot.get("namenode_CorruptBlocks"), Some(-1.0));
    }

    #[test]
    fn test_malformed_document() {
        let docs: [&[u8]; 4] = [b"not json", b"[]", b"{}", br#"{"beans": 1}"#];
        for doc in docs {
            let err = extract(doc, &test_config()).unwrap_err();
            assert!(matches!(err, MapError::Malformed(_)));
        }
    }

    #[test]
    fn test_extract_is_idempotent() {
        let doc = body(json!({
            "beans": [
                {"name": FS, "CapacityTotal": 1000, "tag.HAState": "active"},
                {"name": MEMORY, "HeapMemoryUsage": {"used": 0.25}}
            ]
        }));

        let first = extract(&doc, &test_config()).unwrap();
        let second = extract(&doc, &test_config()).unwrap();
        assert_eq!(first, second);
        for ((n1, v1), (n2, v2)) in first.iter().zip(second.iter()) {
            assert_eq!(n1, n2);
            assert_eq!(v1.to_bits(), v2.to_bits());
        }
    }
}
