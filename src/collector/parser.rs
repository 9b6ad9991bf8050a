//! Hadoop `/jmx` document parser
//!
//! The servlet answers with `{"beans": [{"name": "...", ...}, ...]}`. Parsing
//! turns that into a [`BeanIndex`] keyed by bean name; every shape check is an
//! explicit match on [`serde_json::Value`].

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::MapError;

/// Mapping result type
pub type MapResult<T> = Result<T, MapError>;

/// One bean record: attribute name to JSON value
pub type Bean = Map<String, Value>;

/// Beans of one document, indexed by `name`
#[derive(Debug, Clone, Default)]
pub struct BeanIndex {
    beans: HashMap<String, Bean>,
}

impl BeanIndex {
    /// Parse a raw `/jmx` response body
    ///
    /// # Errors
    /// Returns [`MapError::Malformed`] when the body is not JSON, the top level
    /// is not an object, `beans` is missing or not an array, or an element of
    /// `beans` is not an object.
    ///
    /// # Notes
    /// - Elements without a string `name` are skipped
    /// - When a name repeats, the last occurrence wins
    pub fn parse(body: &[u8]) -> MapResult<Self> {
        let document: Value = serde_json::from_slice(body)
            .map_err(|e| MapError::Malformed(format!("invalid JSON: {}", e)))?;

        let root = match document {
            Value::Object(root) => root,
            other => {
                return Err(MapError::Malformed(format!(
                    "expected a JSON object at top level, got {}",
                    type_name(&other)
                )))
            }
        };

        let entries = match root.get("beans") {
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(MapError::Malformed(format!(
                    "'beans' must be an array, got {}",
                    type_name(other)
                )))
            }
            None => return Err(MapError::Malformed("missing 'beans' array".to_string())),
        };

        let mut beans = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            let Value::Object(bean) = entry else {
                return Err(MapError::Malformed(format!(
                    "bean at index {} is {}, expected an object",
                    position,
                    type_name(entry)
                )));
            };

            match bean.get("name") {
                Some(Value::String(name)) => {
                    beans.insert(name.clone(), bean.clone());
                }
                _ => {
                    tracing::trace!(index = position, "Skipping bean without a string name");
                }
            }
        }

        Ok(Self { beans })
    }

    /// Look up a bean by exact name
    pub fn get(&self, name: &str) -> Option<&Bean> {
        self.beans.get(name)
    }

    /// Number of distinct bean names
    pub fn len(&self) -> usize {
        self.beans.len()
    }

    /// Whether the document had no named beans
    pub fn is_empty(&self) -> bool {
        self.beans.is_empty()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
