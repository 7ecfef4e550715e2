//! Chart Data - record filtering, bucketing and aggregation
//!
//! This crate turns raw tabular records into the numbers a dashboard chart
//! or table displays.
//!
//! # Features
//!
//! - JSON record loading with nested object flattening and root paths
//! - Filter engine with string, numeric and substring operators
//! - Terms, histogram, date histogram, range and split buckets
//! - Sum/avg/count/min/max aggregation per category and per series
//! - Scatter, bubble and radar dataset processors
//! - Table sorting, searching and pagination
//!
//! # Example
//!
//! ```rust
//! use chart_data::{parse_records, process_buckets, Aggregation, BucketSpec, BucketType, Metric};
//!
//! let records = parse_records(r#"[{"month": "Jan", "sales": 100}, {"month": "Feb", "sales": 200}]"#).unwrap();
//! let buckets = vec![BucketSpec::new(BucketType::Terms, "month")];
//! let metrics = vec![Metric::new("sales", Aggregation::Sum)];
//!
//! let processed = process_buckets(&records, &buckets, &metrics);
//! assert_eq!(processed.labels(), ["Jan", "Feb"]);
//! assert_eq!(processed.primary().unwrap().series[0].values, vec![100.0, 200.0]);
//! ```

mod error;
mod loader;
mod record;
mod validation;
pub mod aggregate;
pub mod bucket;
pub mod dataset;
pub mod filter;
pub mod metric;
pub mod style;
pub mod table;

// Re-export main types
pub use error::{DataError, Result};
pub use loader::{parse_records, LoadConfig, RecordLoader};
pub use record::{format_number, looks_like_iso_date, record, Record, Value};
pub use validation::ValidationResult;
pub use aggregate::{process_buckets, AggregatedSeries, BucketedData, Panel, ProcessedData, ALL_LABEL};
pub use bucket::{
    create_default_bucket, generate_bucket_label, get_split_type, is_split_bucket, validate_bucket, BucketSpec,
    BucketType, DateInterval, RangeSpec, SortOrder, SplitType,
};
pub use dataset::{
    calculate_scatter_scales, calculate_symbol_size, convert_to_bubble_data, convert_to_scatter_data,
    process_bubble_data, process_radar_data, process_scatter_data, validate_bubble_configuration,
    validate_radar_configuration, validate_scatter_configuration, AxisScale, DatasetData, PointDataset, PointSeries,
    RadarDataset, RadarIndicator, RadarSeries, ScatterPoint, ScatterScales,
};
pub use filter::{apply_all_filters, apply_filter, validate_filter, Filter, FilterOperator};
pub use metric::{aggregate, Aggregation, Metric};
pub use style::{ColumnAlign, ColumnFormat, MetricStyle, SeriesType};
pub use table::{
    apply_table_filters, derive_columns, infer_columns, paginate_table_data, process_table, search_table_data,
    sort_table_data, TableColumn, TableRequest, TableResult, TableSort,
};
