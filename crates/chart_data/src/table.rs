//! Table processing
//!
//! Filter, sort, search and paginate raw records for tabular display, and
//! derive the column set either from chart configuration or from the data.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::bucket::{BucketSpec, BucketType, SortOrder};
use crate::filter::{apply_all_filters, Filter};
use crate::metric::Metric;
use crate::record::{looks_like_iso_date, Record, Value};
use crate::style::{style_at, ColumnAlign, ColumnFormat, MetricStyle};

pub const DEFAULT_PAGE_SIZE: usize = 25;

/// A displayed column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableColumn {
    pub key: String,
    pub label: String,
    pub format: ColumnFormat,
    pub width: Option<u32>,
    pub align: Option<ColumnAlign>,
    pub visible: bool,
}

impl Default for TableColumn {
    fn default() -> Self {
        Self {
            key: String::new(),
            label: String::new(),
            format: ColumnFormat::Text,
            width: None,
            align: None,
            visible: true,
        }
    }
}

impl TableColumn {
    pub fn new(key: impl Into<String>, format: ColumnFormat) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            format,
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    fn styled(mut self, style: Option<&MetricStyle>) -> Self {
        if let Some(style) = style {
            self.width = style.width.or(self.width);
            self.align = style.align.or(self.align);
            self.format = style.format.unwrap_or(self.format);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSort {
    pub key: String,
    #[serde(default = "ascending")]
    pub direction: SortOrder,
}

fn ascending() -> SortOrder {
    SortOrder::Asc
}

/// Everything needed to produce one page of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableRequest {
    pub columns: Vec<TableColumn>,
    pub buckets: Vec<BucketSpec>,
    pub metrics: Vec<Metric>,
    pub metric_styles: Vec<MetricStyle>,
    pub global_filters: Vec<Filter>,
    pub sort: Option<TableSort>,
    pub search: Option<String>,
    pub page: usize,
    pub page_size: usize,
}

impl Default for TableRequest {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            buckets: Vec::new(),
            metrics: Vec::new(),
            metric_styles: Vec::new(),
            global_filters: Vec::new(),
            sort: None,
            search: None,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of processed rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResult {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Record>,
    pub total_rows: usize,
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
}

/// Global filters only; tables have no per-series filters
pub fn apply_table_filters(records: &[Record], filters: &[Filter]) -> Vec<Record> {
    apply_all_filters(records, Some(filters), None)
}

/// Stable sort on one key. Missing and null values go last in either direction.
pub fn sort_table_data(records: &[Record], key: &str, direction: SortOrder) -> Vec<Record> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let left = a.get(key).filter(|v| !v.is_null());
        let right = b.get(key).filter(|v| !v.is_null());
        match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(l), Some(r)) => {
                let ord = compare_values(l, r);
                match direction {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            }
        }
    });
    sorted
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    let (l, r) = (left.to_number(), right.to_number());
    if !l.is_nan() && !r.is_nan() {
        return l.partial_cmp(&r).unwrap_or(Ordering::Equal);
    }
    let (l, r) = (left.to_string_value(), right.to_string_value());
    l.to_lowercase().cmp(&r.to_lowercase()).then_with(|| l.cmp(&r))
}

/// Case-insensitive substring search over the visible columns.
///
/// With no columns every field is searched. An empty query passes through.
pub fn search_table_data(records: &[Record], query: &str, columns: &[TableColumn]) -> Vec<Record> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }

    let keys: Vec<&str> = columns
        .iter()
        .filter(|c| c.visible)
        .map(|c| c.key.as_str())
        .collect();

    records
        .iter()
        .filter(|record| {
            let hit = |v: &Value| v.to_string_value().to_lowercase().contains(&needle);
            if columns.is_empty() {
                record.values().any(hit)
            } else {
                keys.iter().filter_map(|k| record.get(*k)).any(hit)
            }
        })
        .cloned()
        .collect()
}

/// Zero-based page slice; out-of-range pages and a zero page size are empty
pub fn paginate_table_data(records: &[Record], page: usize, page_size: usize) -> Vec<Record> {
    if page_size == 0 {
        return Vec::new();
    }
    let start = page.saturating_mul(page_size);
    if start >= records.len() {
        return Vec::new();
    }
    let end = start.saturating_add(page_size).min(records.len());
    records[start..end].to_vec()
}

/// Columns from chart configuration: buckets first, then metrics.
///
/// Metric style width, alignment and format override the defaults. Keys are
/// de-duplicated and the first occurrence wins.
pub fn derive_columns(buckets: &[BucketSpec], metrics: &[Metric], styles: &[MetricStyle]) -> Vec<TableColumn> {
    let bucket_columns = buckets.iter().filter(|b| b.has_field()).map(|bucket| {
        let format = match bucket.bucket_type {
            BucketType::DateHistogram => ColumnFormat::Date,
            BucketType::Histogram => ColumnFormat::Number,
            _ => ColumnFormat::Text,
        };
        let label = match bucket.label {
            Some(ref label) if !label.is_empty() => label.clone(),
            _ => bucket.field.clone(),
        };
        TableColumn::new(bucket.field.clone(), format).with_label(label)
    });

    let metric_columns = metrics
        .iter()
        .enumerate()
        .filter(|(_, m)| !m.field.trim().is_empty())
        .map(|(i, metric)| {
            TableColumn::new(metric.field.clone(), ColumnFormat::Number)
                .with_label(metric.series_name())
                .styled(style_at(styles, i))
        });

    let mut columns: Vec<TableColumn> = Vec::new();
    for column in bucket_columns.chain(metric_columns) {
        if !columns.iter().any(|c| c.key == column.key) {
            columns.push(column);
        }
    }
    columns
}

/// Columns inferred from the first record's fields
pub fn infer_columns(records: &[Record]) -> Vec<TableColumn> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    first
        .iter()
        .map(|(key, value)| {
            let format = match value {
                Value::Number(_) => ColumnFormat::Number,
                Value::Date(_) => ColumnFormat::Date,
                Value::Text(s) if looks_like_iso_date(s) => ColumnFormat::Date,
                _ => ColumnFormat::Text,
            };
            TableColumn::new(key.clone(), format)
        })
        .collect()
}

/// Filters, then sort, then search, then paginate
pub fn process_table(records: &[Record], request: &TableRequest) -> TableResult {
    let columns = if !request.columns.is_empty() {
        request.columns.clone()
    } else if !request.buckets.is_empty() || !request.metrics.is_empty() {
        derive_columns(&request.buckets, &request.metrics, &request.metric_styles)
    } else {
        infer_columns(records)
    };

    let mut rows = apply_table_filters(records, &request.global_filters);
    if let Some(ref sort) = request.sort {
        rows = sort_table_data(&rows, &sort.key, sort.direction);
    }
    if let Some(ref query) = request.search {
        rows = search_table_data(&rows, query, &columns);
    }

    let total_rows = rows.len();
    let page_count = if request.page_size == 0 {
        0
    } else {
        total_rows.div_ceil(request.page_size)
    };
    let page_rows = paginate_table_data(&rows, request.page, request.page_size);

    tracing::debug!(total_rows, page = request.page, returned = page_rows.len(), "processed table");

    TableResult {
        columns,
        rows: page_rows,
        total_rows,
        page: request.page,
        page_size: request.page_size,
        page_count,
    }
}
