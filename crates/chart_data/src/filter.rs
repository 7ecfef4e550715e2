//! Filter engine
//!
//! Evaluates `{ field, operator, value }` predicates against record sets.
//! Global filters and per-series dataset filters are applied in sequence:
//! every global filter in order, then every dataset filter in order.

use serde::{Deserialize, Serialize};

use crate::record::{Record, Value};
use crate::validation::ValidationResult;

/// Comparison operator for a filter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    StartsWith,
    EndsWith,
    /// Unrecognized operator; evaluated as string equality
    Unknown(String),
}

impl FilterOperator {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::GreaterEqual => "greater_equal",
            Self::LessEqual => "less_equal",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Unknown(s) => s,
        }
    }

    /// Evaluate the operator with the record's value on the left
    pub fn evaluate(&self, left: &Value, right: &Value) -> bool {
        match self {
            Self::Equals | Self::Unknown(_) => left.to_string_value() == right.to_string_value(),
            Self::NotEquals => left.to_string_value() != right.to_string_value(),
            Self::Contains => lowered(left).contains(&lowered(right)),
            Self::NotContains => !lowered(left).contains(&lowered(right)),
            Self::StartsWith => lowered(left).starts_with(&lowered(right)),
            Self::EndsWith => lowered(left).ends_with(&lowered(right)),
            // NaN on either side makes every comparison false
            Self::GreaterThan => left.to_number() > right.to_number(),
            Self::LessThan => left.to_number() < right.to_number(),
            Self::GreaterEqual => left.to_number() >= right.to_number(),
            Self::LessEqual => left.to_number() <= right.to_number(),
        }
    }
}

impl Default for FilterOperator {
    fn default() -> Self {
        Self::Equals
    }
}

impl From<String> for FilterOperator {
    fn from(s: String) -> Self {
        match s.trim() {
            "equals" => Self::Equals,
            "not_equals" => Self::NotEquals,
            "contains" => Self::Contains,
            "not_contains" => Self::NotContains,
            "greater_than" => Self::GreaterThan,
            "less_than" => Self::LessThan,
            "greater_equal" => Self::GreaterEqual,
            "less_equal" => Self::LessEqual,
            "starts_with" => Self::StartsWith,
            "ends_with" => Self::EndsWith,
            _ => Self::Unknown(s),
        }
    }
}

impl From<&str> for FilterOperator {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        op.as_str().to_string()
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn lowered(value: &Value) -> String {
    value.to_string_value().to_lowercase()
}

/// A single predicate over one field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: impl Into<FilterOperator>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// A filter without a field or without a value passes every record
    pub fn is_noop(&self) -> bool {
        self.field.trim().is_empty() || is_empty_value(&self.value)
    }

    /// Test a single record
    pub fn matches(&self, record: &Record) -> bool {
        match record.get(&self.field) {
            Some(value) => self.operator.evaluate(value, &self.value),
            None => false,
        }
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Text(s) => s.is_empty(),
        _ => false,
    }
}

/// Apply one filter, returning the surviving records
pub fn apply_filter(records: &[Record], filter: &Filter) -> Vec<Record> {
    if filter.is_noop() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect()
}

/// Apply global filters in order, then dataset filters in order
pub fn apply_all_filters(
    records: &[Record],
    global_filters: Option<&[Filter]>,
    dataset_filters: Option<&[Filter]>,
) -> Vec<Record> {
    let filters = global_filters
        .unwrap_or_default()
        .iter()
        .chain(dataset_filters.unwrap_or_default())
        .filter(|filter| !filter.is_noop());

    let mut current = records.to_vec();
    for filter in filters {
        current.retain(|record| filter.matches(record));
    }
    current
}

/// Check a filter for missing parts and unknown operators
pub fn validate_filter(filter: &Filter) -> ValidationResult {
    let mut result = ValidationResult::valid();
    if filter.field.trim().is_empty() {
        result.add_error("Filter field is required");
    }
    if is_empty_value(&filter.value) {
        result.add_error("Filter value is required");
    }
    if let FilterOperator::Unknown(ref op) = filter.operator {
        result.add_error(format!("Unknown filter operator: {}", op));
    }
    result
}
