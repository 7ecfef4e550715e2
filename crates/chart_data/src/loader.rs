//! Record loading from JSON
//!
//! The data-fetch layer hands over rows as JSON. This module turns them into
//! [`Record`]s, flattening nested objects with dot notation.

use std::path::Path;

use serde_json::{Map, Value as JsonValue};

use crate::error::{DataError, Result};
use crate::record::{Record, Value};

/// Record loader configuration
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Root path to the data array (e.g., "data.rows")
    pub root_path: Option<String>,
    /// Whether to flatten nested objects with dot notation
    pub flatten_nested: bool,
    /// Maximum nesting depth for flattening
    pub max_depth: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            root_path: None,
            flatten_nested: true,
            max_depth: 3,
        }
    }
}

impl LoadConfig {
    /// Set the root path for the data array
    pub fn with_root_path(mut self, path: impl Into<String>) -> Self {
        self.root_path = Some(path.into());
        self
    }

    /// Set whether to flatten nested objects
    pub fn with_flatten(mut self, flatten: bool) -> Self {
        self.flatten_nested = flatten;
        self
    }

    /// Set maximum depth for flattening
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Loads records from JSON strings or files
#[derive(Debug, Clone, Default)]
pub struct RecordLoader {
    config: LoadConfig,
}

impl RecordLoader {
    /// Create a loader with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with custom configuration
    pub fn with_config(config: LoadConfig) -> Self {
        Self { config }
    }

    /// Load records from a JSON file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Vec<Record>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        self.load_str(&content)
    }

    /// Load records from a JSON string
    pub fn load_str(&self, data: &str) -> Result<Vec<Record>> {
        let json: JsonValue = serde_json::from_str(data)?;
        self.load_value(&json)
    }

    /// Load records from an already-parsed JSON value.
    ///
    /// An empty array yields no records; emptiness is not an error.
    pub fn load_value(&self, json: &JsonValue) -> Result<Vec<Record>> {
        let data = match self.config.root_path {
            Some(ref path) => navigate_to_path(json, path)?,
            None => json,
        };

        match data {
            JsonValue::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    JsonValue::Object(obj) => Ok(self.object_to_record(obj, "", 0)),
                    _ => Err(DataError::InvalidRecords(format!(
                        "Element {} is not an object",
                        index
                    ))),
                })
                .collect(),
            JsonValue::Object(obj) => Ok(vec![self.object_to_record(obj, "", 0)]),
            _ => Err(DataError::InvalidRecords(
                "Expected JSON array or object".to_string(),
            )),
        }
    }

    fn object_to_record(&self, obj: &Map<String, JsonValue>, prefix: &str, depth: usize) -> Record {
        let mut record = Record::new();

        for (key, value) in obj {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", prefix, key)
            };

            match value {
                JsonValue::Object(nested)
                    if self.config.flatten_nested && depth < self.config.max_depth =>
                {
                    record.extend(self.object_to_record(nested, &full_key, depth + 1));
                }
                _ => {
                    record.insert(full_key, json_value_to_value(value));
                }
            }
        }

        record
    }
}

/// Convenience wrapper around [`RecordLoader::load_str`] with default settings
pub fn parse_records(data: &str) -> Result<Vec<Record>> {
    RecordLoader::new().load_str(data)
}

/// Navigate to a nested path in a JSON value using dot notation
fn navigate_to_path<'a>(json: &'a JsonValue, path: &str) -> Result<&'a JsonValue> {
    let mut current = json;

    for part in path.split('.') {
        current = match current {
            JsonValue::Object(obj) => obj
                .get(part)
                .ok_or_else(|| DataError::InvalidPath(format!("Path '{}' not found", path)))?,
            JsonValue::Array(arr) => {
                let index: usize = part.parse().map_err(|_| {
                    DataError::InvalidPath(format!(
                        "Expected numeric index for array access, got '{}'",
                        part
                    ))
                })?;
                arr.get(index).ok_or_else(|| {
                    DataError::InvalidPath(format!("Array index {} out of bounds", index))
                })?
            }
            _ => {
                return Err(DataError::InvalidPath(format!(
                    "Cannot access '{}' on non-object/array value",
                    part
                )))
            }
        };
    }

    Ok(current)
}

fn json_value_to_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => Value::Text(json.to_string()),
    }
}
