//! Bucket (grouping) specifications
//!
//! A bucket partitions records into labeled categories for a chart's
//! category axis. The `split_*` types instead fan one field's distinct
//! values out into separate series, rows or charts.

use serde::{Deserialize, Serialize};

use crate::validation::ValidationResult;

/// Kind of grouping a bucket performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketType {
    Terms,
    Histogram,
    DateHistogram,
    Range,
    SplitSeries,
    SplitRows,
    SplitChart,
}

impl BucketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketType::Terms => "terms",
            BucketType::Histogram => "histogram",
            BucketType::DateHistogram => "date_histogram",
            BucketType::Range => "range",
            BucketType::SplitSeries => "split_series",
            BucketType::SplitRows => "split_rows",
            BucketType::SplitChart => "split_chart",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BucketType::Terms => "Terms",
            BucketType::Histogram => "Histogram",
            BucketType::DateHistogram => "Date Histogram",
            BucketType::Range => "Range",
            BucketType::SplitSeries => "Split Series",
            BucketType::SplitRows => "Split Rows",
            BucketType::SplitChart => "Split Chart",
        }
    }

    /// Split types carry the `split_` prefix
    pub fn is_split(&self) -> bool {
        self.as_str().starts_with("split_")
    }

    pub fn split_type(&self) -> Option<SplitType> {
        match self {
            BucketType::SplitSeries => Some(SplitType::Series),
            BucketType::SplitRows => Some(SplitType::Rows),
            BucketType::SplitChart => Some(SplitType::Chart),
            _ => None,
        }
    }
}

impl Default for BucketType {
    fn default() -> Self {
        BucketType::Terms
    }
}

impl std::fmt::Display for BucketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a split bucket fans out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    Series,
    Rows,
    Chart,
}

/// Sort direction for term buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

/// Calendar interval for date histograms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateInterval {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl DateInterval {
    /// chrono format string used for bucket labels
    pub fn label_format(&self) -> &'static str {
        match self {
            DateInterval::Minute => "%Y-%m-%d %H:%M",
            DateInterval::Hour => "%Y-%m-%d %H:00",
            DateInterval::Day | DateInterval::Week => "%Y-%m-%d",
            DateInterval::Month => "%Y-%m",
            DateInterval::Year => "%Y",
        }
    }
}

/// One explicit `[from, to)` range; open ends are unbounded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeSpec {
    pub from: Option<f64>,
    pub to: Option<f64>,
    pub label: Option<String>,
}

impl RangeSpec {
    pub fn new(from: Option<f64>, to: Option<f64>) -> Self {
        Self { from, to, label: None }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn contains(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        self.from.map_or(true, |from| value >= from) && self.to.map_or(true, |to| value < to)
    }

    /// Explicit label, else a label derived from the bounds
    pub fn display_label(&self) -> String {
        if let Some(ref label) = self.label {
            if !label.is_empty() {
                return label.clone();
            }
        }
        let fmt = crate::record::format_number;
        match (self.from, self.to) {
            (Some(from), Some(to)) => format!("{} - {}", fmt(from), fmt(to)),
            (Some(from), None) => format!("≥ {}", fmt(from)),
            (None, Some(to)) => format!("< {}", fmt(to)),
            (None, None) => "All".to_string(),
        }
    }
}

/// A grouping specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BucketSpec {
    pub field: String,
    #[serde(rename = "type")]
    pub bucket_type: BucketType,
    pub label: Option<String>,
    pub order: SortOrder,
    pub size: Option<usize>,
    pub min_doc_count: usize,
    pub interval: Option<f64>,
    pub date_interval: Option<DateInterval>,
    pub ranges: Option<Vec<RangeSpec>>,
    pub split_type: Option<SplitType>,
}

impl Default for BucketSpec {
    fn default() -> Self {
        Self {
            field: String::new(),
            bucket_type: BucketType::Terms,
            label: None,
            order: SortOrder::Desc,
            size: None,
            min_doc_count: 1,
            interval: None,
            date_interval: None,
            ranges: None,
            split_type: None,
        }
    }
}

impl BucketSpec {
    pub fn new(bucket_type: BucketType, field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            bucket_type,
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_min_doc_count(mut self, min_doc_count: usize) -> Self {
        self.min_doc_count = min_doc_count;
        self
    }

    pub fn with_interval(mut self, interval: f64) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_date_interval(mut self, interval: DateInterval) -> Self {
        self.date_interval = Some(interval);
        self
    }

    pub fn with_ranges(mut self, ranges: Vec<RangeSpec>) -> Self {
        self.ranges = Some(ranges);
        self
    }

    pub fn has_field(&self) -> bool {
        !self.field.trim().is_empty()
    }

    /// Split type, preferring the bucket type over an explicit `splitType`
    pub fn effective_split_type(&self) -> Option<SplitType> {
        if self.bucket_type.is_split() {
            self.bucket_type.split_type().or(self.split_type)
        } else {
            None
        }
    }
}

/// Type-specific default configuration for a new bucket
pub fn create_default_bucket(bucket_type: BucketType, field: impl Into<String>) -> BucketSpec {
    let base = BucketSpec::new(bucket_type, field);
    match bucket_type {
        BucketType::Terms => base.with_order(SortOrder::Desc).with_size(10),
        BucketType::Histogram => base.with_interval(1.0),
        BucketType::DateHistogram => base.with_date_interval(DateInterval::Day),
        BucketType::Range => base.with_ranges(vec![RangeSpec::new(Some(0.0), Some(100.0))]),
        BucketType::SplitSeries | BucketType::SplitRows => BucketSpec {
            split_type: bucket_type.split_type(),
            ..base.with_size(5)
        },
        BucketType::SplitChart => BucketSpec {
            split_type: bucket_type.split_type(),
            ..base.with_size(4)
        },
    }
}

/// Check a bucket against its type's invariants
pub fn validate_bucket(spec: &BucketSpec) -> ValidationResult {
    let mut result = ValidationResult::valid();

    if !spec.has_field() {
        result.add_error("Bucket field is required");
    }

    match spec.bucket_type {
        BucketType::Histogram => {
            if !spec.interval.is_some_and(|i| i > 0.0) {
                result.add_error("Histogram interval must be greater than 0");
            }
        }
        BucketType::DateHistogram => {
            if spec.date_interval.is_none() {
                result.add_error("Date histogram requires a date interval");
            }
        }
        BucketType::Range => {
            if spec.ranges.as_ref().map_or(true, |r| r.is_empty()) {
                result.add_error("Range bucket requires at least one range");
            }
        }
        _ => {}
    }

    if spec.size == Some(0) {
        result.add_error("Bucket size must be greater than 0");
    }

    result
}

/// Explicit label, else `"<TypeDisplayName> - <field>"`
pub fn generate_bucket_label(spec: &BucketSpec) -> String {
    match spec.label {
        Some(ref label) if !label.is_empty() => label.clone(),
        _ => format!("{} - {}", spec.bucket_type.display_name(), spec.field),
    }
}

pub fn is_split_bucket(spec: &BucketSpec) -> bool {
    spec.bucket_type.is_split()
}

pub fn get_split_type(spec: &BucketSpec) -> Option<SplitType> {
    spec.effective_split_type()
}
