//! Metric definitions and aggregation functions

use serde::{Deserialize, Serialize};

use crate::filter::Filter;
use crate::record::Record;

/// Aggregation applied to a metric's field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Avg,
    Count,
    Min,
    Max,
    /// First value, passed through unaggregated
    None,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Avg => "avg",
            Aggregation::Count => "count",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::None => "none",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Aggregation::Sum => "Sum",
            Aggregation::Avg => "Average",
            Aggregation::Count => "Count",
            Aggregation::Min => "Min",
            Aggregation::Max => "Max",
            Aggregation::None => "Value",
        }
    }
}

/// A field plus aggregation producing one value per category, or a point
/// mapping for dataset-shaped charts (`x`/`y`, `x`/`y`/`r`, or `fields`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metric {
    pub field: String,
    pub agg: Option<Aggregation>,
    pub label: Option<String>,
    pub x: Option<String>,
    pub y: Option<String>,
    pub r: Option<String>,
    pub fields: Vec<String>,
    pub dataset_filters: Vec<Filter>,
}

impl Metric {
    /// A bucketed-chart metric
    pub fn new(field: impl Into<String>, agg: Aggregation) -> Self {
        Self {
            field: field.into(),
            agg: Some(agg),
            ..Default::default()
        }
    }

    /// A scatter metric mapping two fields to coordinates
    pub fn xy(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: Some(x.into()),
            y: Some(y.into()),
            ..Default::default()
        }
    }

    /// A bubble metric mapping three fields to coordinates and radius
    pub fn xyr(x: impl Into<String>, y: impl Into<String>, r: impl Into<String>) -> Self {
        Self {
            r: Some(r.into()),
            ..Self::xy(x, y)
        }
    }

    /// A radar metric aggregating each field onto its own axis
    pub fn radar<I, S>(fields: I, agg: Aggregation) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            agg: Some(agg),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.dataset_filters = filters;
        self
    }

    /// Aggregation to use for bucketed charts; `sum` when unset
    pub fn aggregation(&self) -> Aggregation {
        self.agg.unwrap_or(Aggregation::Sum)
    }

    /// Name shown in legends and tooltips
    pub fn series_name(&self) -> String {
        if let Some(ref label) = self.label {
            if !label.is_empty() {
                return label.clone();
            }
        }
        let agg = self.aggregation();
        if self.field.is_empty() {
            agg.display_name().to_string()
        } else {
            format!("{} of {}", agg.display_name(), self.field)
        }
    }

    /// True if a record passes this metric's own dataset filters
    pub fn accepts(&self, record: &Record) -> bool {
        self.dataset_filters
            .iter()
            .all(|filter| filter.is_noop() || filter.matches(record))
    }
}

/// Aggregate `field` across `records`.
///
/// Non-numeric values count as zero for `sum`/`avg`/`none` and are ignored by
/// `min`/`max`. Empty inputs yield zero, never `NaN`.
pub fn aggregate<'a, I>(records: I, field: &str, agg: Aggregation) -> f64
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut values = records.into_iter().map(|record| record.get(field));

    match agg {
        Aggregation::Count => {
            if field.is_empty() {
                values.count() as f64
            } else {
                values.filter(|v| v.is_some_and(|v| !v.is_null())).count() as f64
            }
        }
        Aggregation::Sum => values
            .map(|v| v.map_or(0.0, |v| v.to_number_or_zero()))
            .sum(),
        Aggregation::Avg => {
            let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| {
                (sum + v.map_or(0.0, |v| v.to_number_or_zero()), count + 1)
            });
            if count == 0 {
                0.0
            } else {
                sum / count as f64
            }
        }
        Aggregation::Min => finite(values.flatten().map(|v| v.to_number()).fold(f64::INFINITY, f64::min)),
        Aggregation::Max => finite(values.flatten().map(|v| v.to_number()).fold(f64::NEG_INFINITY, f64::max)),
        Aggregation::None => values
            .next()
            .flatten()
            .map_or(0.0, |v| v.to_number_or_zero()),
    }
}

// f64::min/max skip NaN operands, so only the empty case is left infinite
fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{record, Value};

    fn sample() -> Vec<Record> {
        vec![
            record([("v", Value::from(10))]),
            record([("v", Value::from(20))]),
            record([("v", Value::from(30))]),
        ]
    }

    #[test]
    fn test_aggregation_correctness() {
        let records = sample();
        assert_eq!(aggregate(&records, "v", Aggregation::Sum), 60.0);
        assert_eq!(aggregate(&records, "v", Aggregation::Avg), 20.0);
        assert_eq!(aggregate(&records, "v", Aggregation::Count), 3.0);
        assert_eq!(aggregate(&records, "v", Aggregation::Min), 10.0);
        assert_eq!(aggregate(&records, "v", Aggregation::Max), 30.0);
        assert_eq!(aggregate(&records, "v", Aggregation::None), 10.0);
    }

    #[test]
    fn test_empty_groups_are_zero() {
        let records: Vec<Record> = Vec::new();
        for agg in [
            Aggregation::Sum,
            Aggregation::Avg,
            Aggregation::Count,
            Aggregation::Min,
            Aggregation::Max,
            Aggregation::None,
        ] {
            assert_eq!(aggregate(&records, "v", agg), 0.0, "{:?}", agg);
        }
    }

    #[test]
    fn test_non_numeric_values() {
        let records = vec![
            record([("v", Value::from("abc"))]),
            record([("v", Value::from(4))]),
            record([("v", Value::Null)]),
            record([("w", Value::from(1))]),
        ];
        assert_eq!(aggregate(&records, "v", Aggregation::Sum), 4.0);
        assert_eq!(aggregate(&records, "v", Aggregation::Avg), 1.0);
        assert_eq!(aggregate(&records, "v", Aggregation::Count), 2.0);
        assert_eq!(aggregate(&records, "v", Aggregation::Min), 4.0);
        assert_eq!(aggregate(&records, "", Aggregation::Count), 4.0);
    }

    #[test]
    fn test_series_name() {
        assert_eq!(Metric::new("sales", Aggregation::Sum).series_name(), "Sum of sales");
        assert_eq!(Metric::new("", Aggregation::Count).series_name(), "Count");
        assert_eq!(
            Metric::new("sales", Aggregation::Avg).with_label("Avg sale").series_name(),
            "Avg sale"
        );
    }

    #[test]
    fn test_metric_accepts_dataset_filters() {
        let metric = Metric::new("v", Aggregation::Sum)
            .with_filters(vec![Filter::new("v", "greater_than", 15), Filter::new("", "equals", "x")]);
        let records = sample();
        let accepted: Vec<_> = records.iter().filter(|r| metric.accepts(r)).collect();
        assert_eq!(accepted.len(), 2);
    }

    #[test]
    fn test_metric_deserialize() {
        let metric: Metric = serde_json::from_str(
            r#"{"fields": ["a", "b"], "agg": "avg", "datasetFilters": [{"field": "t", "operator": "equals", "value": "x"}]}"#,
        )
        .unwrap();
        assert_eq!(metric.fields, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(metric.agg, Some(Aggregation::Avg));
        assert_eq!(metric.dataset_filters.len(), 1);
    }
}
