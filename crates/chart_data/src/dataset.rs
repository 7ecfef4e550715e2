//! Dataset-shaped chart processors
//!
//! Scatter, bubble and radar charts bypass bucketing: each configured metric
//! is a dataset that maps rows directly to points (`x`/`y`, plus `r` for
//! bubbles) or to one value per radar axis.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::filter::{apply_all_filters, Filter};
use crate::metric::{aggregate, Metric};
use crate::record::Record;
use crate::validation::ValidationResult;

pub const NO_DATASETS: &str = "At least one dataset must be configured";
pub const INCONSISTENT_RADAR_FIELDS: &str =
    "Datasets use different field sets; radar axes are the union of all fields";

pub const DEFAULT_MIN_SYMBOL_SIZE: f64 = 10.0;
pub const DEFAULT_MAX_SYMBOL_SIZE: f64 = 50.0;
pub const DEFAULT_RADAR_SCALE_FACTOR: f64 = 1.2;
const DEFAULT_RADAR_MAX: f64 = 100.0;
const DEFAULT_SCALE: AxisScale = AxisScale { min: 0.0, max: 100.0 };

/// One plotted point; `r` and `symbol_size` are only set for bubbles
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_size: Option<f64>,
}

impl ScatterPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }
}

/// Inclusive bounds for one numeric axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisScale {
    pub min: f64,
    pub max: f64,
}

impl AxisScale {
    fn padded(min: f64, max: f64) -> Self {
        let range = max - min;
        let pad = if range == 0.0 { 1.0 } else { range / 10.0 };
        Self {
            min: min - pad,
            max: max + pad,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterScales {
    pub x: AxisScale,
    pub y: AxisScale,
}

impl Default for ScatterScales {
    fn default() -> Self {
        Self {
            x: DEFAULT_SCALE,
            y: DEFAULT_SCALE,
        }
    }
}

/// Points produced by one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointSeries {
    pub name: String,
    pub metric_index: usize,
    pub points: Vec<ScatterPoint>,
}

/// Processed scatter or bubble datasets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointDataset {
    pub series: Vec<PointSeries>,
    pub scales: ScatterScales,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarIndicator {
    pub name: String,
    pub max: f64,
}

/// Per-dataset values, one per indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarSeries {
    pub name: String,
    pub metric_index: usize,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadarDataset {
    pub indicators: Vec<RadarIndicator>,
    pub series: Vec<RadarSeries>,
}

/// Processed data for any dataset-shaped chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum DatasetData {
    Points(PointDataset),
    Radar(RadarDataset),
}

fn has_text(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|f| !f.trim().is_empty())
}

fn dataset_name(metric: &Metric, index: usize) -> String {
    match metric.label {
        Some(ref label) if !label.is_empty() => label.clone(),
        _ => format!("Dataset {}", index + 1),
    }
}

pub fn validate_scatter_configuration(metrics: &[Metric]) -> ValidationResult {
    if metrics.is_empty() {
        return ValidationResult::valid().with_error(NO_DATASETS);
    }
    let mut result = ValidationResult::valid();
    for (i, metric) in metrics.iter().enumerate() {
        if !has_text(&metric.x) {
            result.add_error(format!("Dataset {}: X-axis field is required", i + 1));
        }
        if !has_text(&metric.y) {
            result.add_error(format!("Dataset {}: Y-axis field is required", i + 1));
        }
    }
    result
}

pub fn validate_bubble_configuration(metrics: &[Metric]) -> ValidationResult {
    if metrics.is_empty() {
        return ValidationResult::valid().with_error(NO_DATASETS);
    }
    let mut result = ValidationResult::valid();
    for (i, metric) in metrics.iter().enumerate() {
        if !has_text(&metric.x) {
            result.add_error(format!("Dataset {}: X-axis field is required", i + 1));
        }
        if !has_text(&metric.y) {
            result.add_error(format!("Dataset {}: Y-axis field is required", i + 1));
        }
        if !has_text(&metric.r) {
            result.add_error(format!("Dataset {}: Radius field is required", i + 1));
        }
    }
    result
}

/// Radar datasets need fields and an explicit aggregation. Mismatched field
/// sets only warn: the chart still renders over the union of axes.
pub fn validate_radar_configuration(metrics: &[Metric]) -> ValidationResult {
    if metrics.is_empty() {
        return ValidationResult::valid().with_error(NO_DATASETS);
    }
    let mut result = ValidationResult::valid();
    for (i, metric) in metrics.iter().enumerate() {
        if metric.fields.iter().all(|f| f.trim().is_empty()) {
            result.add_error(format!("Dataset {}: At least one field is required", i + 1));
        }
        if metric.agg.is_none() {
            result.add_error(format!("Dataset {}: Aggregation is required", i + 1));
        }
    }

    let field_sets: Vec<BTreeSet<&str>> = metrics
        .iter()
        .map(|m| m.fields.iter().map(String::as_str).collect())
        .collect();
    if field_sets.windows(2).any(|pair| pair[0] != pair[1]) {
        result.add_warning(INCONSISTENT_RADAR_FIELDS);
    }
    result
}

fn numeric_field(record: &Record, field: Option<&str>) -> f64 {
    field
        .and_then(|f| record.get(f))
        .map_or(0.0, |v| v.to_number_or_zero())
}

/// Map rows to points; missing or non-numeric coordinates become 0.
///
/// Global filters run first, then the metric's own dataset filters.
pub fn convert_to_scatter_data(
    records: &[Record],
    metric: &Metric,
    global_filters: Option<&[Filter]>,
) -> Vec<ScatterPoint> {
    let rows = apply_all_filters(records, global_filters, Some(&metric.dataset_filters));
    rows.iter()
        .map(|row| {
            ScatterPoint::new(
                numeric_field(row, metric.x.as_deref()),
                numeric_field(row, metric.y.as_deref()),
            )
        })
        .collect()
}

/// Scatter conversion plus a radius and a symbol size scaled against the
/// largest radius in this series
pub fn convert_to_bubble_data(
    records: &[Record],
    metric: &Metric,
    global_filters: Option<&[Filter]>,
) -> Vec<ScatterPoint> {
    let rows = apply_all_filters(records, global_filters, Some(&metric.dataset_filters));
    let radii: Vec<f64> = rows
        .iter()
        .map(|row| numeric_field(row, metric.r.as_deref()))
        .collect();
    let max_radius = radii.iter().copied().fold(0.0, f64::max);

    rows.iter()
        .zip(radii)
        .map(|(row, r)| ScatterPoint {
            r: Some(r),
            symbol_size: Some(calculate_symbol_size(
                r,
                max_radius,
                DEFAULT_MIN_SYMBOL_SIZE,
                DEFAULT_MAX_SYMBOL_SIZE,
            )),
            ..ScatterPoint::new(
                numeric_field(row, metric.x.as_deref()),
                numeric_field(row, metric.y.as_deref()),
            )
        })
        .collect()
}

/// Linear interpolation of `radius` into `[min_size, max_size]`
pub fn calculate_symbol_size(radius: f64, max_radius: f64, min_size: f64, max_size: f64) -> f64 {
    let max_radius = if max_radius > 0.0 { max_radius } else { 1.0 };
    let ratio = (radius / max_radius).clamp(0.0, 1.0);
    let ratio = if ratio.is_nan() { 0.0 } else { ratio };
    min_size + ratio * (max_size - min_size)
}

/// Padded bounds over the union of every dataset's points
pub fn calculate_scatter_scales(records: &[Record], metrics: &[Metric]) -> ScatterScales {
    let points: Vec<ScatterPoint> = metrics
        .iter()
        .flat_map(|metric| convert_to_scatter_data(records, metric, None))
        .collect();
    scales_for_points(points.iter())
}

pub fn scales_for_points<'a, I>(points: I) -> ScatterScales
where
    I: IntoIterator<Item = &'a ScatterPoint>,
{
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for p in points {
        bounds = Some(match bounds {
            None => (p.x, p.x, p.y, p.y),
            Some((x0, x1, y0, y1)) => (x0.min(p.x), x1.max(p.x), y0.min(p.y), y1.max(p.y)),
        });
    }
    match bounds {
        Some((x0, x1, y0, y1)) => ScatterScales {
            x: AxisScale::padded(x0, x1),
            y: AxisScale::padded(y0, y1),
        },
        None => ScatterScales::default(),
    }
}

pub fn process_scatter_data(records: &[Record], metrics: &[Metric], global_filters: Option<&[Filter]>) -> PointDataset {
    process_points(records, metrics, global_filters, convert_to_scatter_data)
}

pub fn process_bubble_data(records: &[Record], metrics: &[Metric], global_filters: Option<&[Filter]>) -> PointDataset {
    process_points(records, metrics, global_filters, convert_to_bubble_data)
}

fn process_points<F>(
    records: &[Record],
    metrics: &[Metric],
    global_filters: Option<&[Filter]>,
    convert: F,
) -> PointDataset
where
    F: Fn(&[Record], &Metric, Option<&[Filter]>) -> Vec<ScatterPoint>,
{
    let series: Vec<PointSeries> = metrics
        .iter()
        .enumerate()
        .map(|(index, metric)| PointSeries {
            name: dataset_name(metric, index),
            metric_index: index,
            points: convert(records, metric, global_filters),
        })
        .collect();
    let scales = scales_for_points(series.iter().flat_map(|s| s.points.iter()));

    tracing::debug!(datasets = series.len(), "processed point datasets");
    PointDataset { series, scales }
}

/// Union of every dataset's fields, de-duplicated in first-seen order
pub fn radar_axes(metrics: &[Metric]) -> Vec<String> {
    let mut axes: Vec<String> = Vec::new();
    for field in metrics.iter().flat_map(|m| m.fields.iter()) {
        if !field.trim().is_empty() && !axes.contains(field) {
            axes.push(field.clone());
        }
    }
    axes
}

/// Aggregate each dataset onto every axis; uncovered axes read 0
pub fn process_radar_data(
    records: &[Record],
    metrics: &[Metric],
    global_filters: Option<&[Filter]>,
    scale_factor: f64,
) -> RadarDataset {
    let axes = radar_axes(metrics);

    let series: Vec<RadarSeries> = metrics
        .iter()
        .enumerate()
        .map(|(index, metric)| {
            let rows = apply_all_filters(records, global_filters, Some(&metric.dataset_filters));
            let agg = metric.aggregation();
            let values = axes
                .iter()
                .map(|axis| {
                    if metric.fields.contains(axis) {
                        aggregate(&rows, axis, agg)
                    } else {
                        0.0
                    }
                })
                .collect();
            RadarSeries {
                name: dataset_name(metric, index),
                metric_index: index,
                values,
            }
        })
        .collect();

    let indicators = axes
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let observed = series
                .iter()
                .filter_map(|s| s.values.get(i).copied())
                .fold(0.0, f64::max);
            let max = if observed > 0.0 {
                observed * scale_factor
            } else {
                DEFAULT_RADAR_MAX
            };
            RadarIndicator { name, max }
        })
        .collect();

    RadarDataset { indicators, series }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::Aggregation;
    use crate::record::{record, Value};

    fn points() -> Vec<Record> {
        vec![
            record([("x", Value::from(0)), ("y", Value::from(100)), ("r", Value::from(5)), ("g", Value::from("a"))]),
            record([("x", Value::from(100)), ("y", Value::from(0)), ("r", Value::from(10)), ("g", Value::from("b"))]),
            record([("x", Value::from(50)), ("y", Value::from("oops")), ("r", Value::from(0)), ("g", Value::from("a"))]),
        ]
    }

    #[test]
    fn test_empty_datasets_are_invalid() {
        for result in [
            validate_scatter_configuration(&[]),
            validate_bubble_configuration(&[]),
            validate_radar_configuration(&[]),
        ] {
            assert!(!result.is_valid);
            assert_eq!(result.errors, vec![NO_DATASETS.to_string()]);
        }
    }

    #[test]
    fn test_scatter_validation_messages() {
        let metrics = vec![Metric::xy("x", "y"), Metric::default()];
        let result = validate_scatter_configuration(&metrics);
        assert_eq!(
            result.errors,
            vec![
                "Dataset 2: X-axis field is required".to_string(),
                "Dataset 2: Y-axis field is required".to_string(),
            ]
        );

        let result = validate_bubble_configuration(&[Metric::xy("x", "y")]);
        assert_eq!(result.errors, vec!["Dataset 1: Radius field is required".to_string()]);
    }

    #[test]
    fn test_scatter_conversion_and_scales() {
        let metric = Metric::xy("x", "y");
        let converted = convert_to_scatter_data(&points(), &metric, None);
        assert_eq!(converted.len(), 3);
        assert_eq!(converted[2], ScatterPoint::new(50.0, 0.0));

        let scales = calculate_scatter_scales(&points(), &[metric]);
        assert_eq!(scales.x, AxisScale { min: -10.0, max: 110.0 });
        assert_eq!(scales.y, AxisScale { min: -10.0, max: 110.0 });
    }

    #[test]
    fn test_scales_defaults_and_zero_range() {
        assert_eq!(calculate_scatter_scales(&[], &[Metric::xy("x", "y")]), ScatterScales::default());
        assert_eq!(calculate_scatter_scales(&points(), &[]), ScatterScales::default());

        let single = [ScatterPoint::new(5.0, 5.0)];
        let scales = scales_for_points(single.iter());
        assert_eq!(scales.x, AxisScale { min: 4.0, max: 6.0 });
    }

    #[test]
    fn test_scatter_filters_global_then_dataset() {
        let metric = Metric::xy("x", "y").with_filters(vec![Filter::new("x", "greater_than", 10)]);
        let global = vec![Filter::new("g", "equals", "a")];
        let converted = convert_to_scatter_data(&points(), &metric, Some(&global));
        assert_eq!(converted, vec![ScatterPoint::new(50.0, 0.0)]);
    }

    #[test]
    fn test_symbol_size() {
        assert_eq!(calculate_symbol_size(10.0, 10.0, 10.0, 50.0), 50.0);
        assert_eq!(calculate_symbol_size(5.0, 10.0, 10.0, 50.0), 30.0);
        assert_eq!(calculate_symbol_size(0.0, 0.0, 10.0, 50.0), 10.0);
        assert_eq!(calculate_symbol_size(20.0, 10.0, 10.0, 50.0), 50.0);
        assert_eq!(calculate_symbol_size(-3.0, 10.0, 10.0, 50.0), 10.0);
    }

    #[test]
    fn test_bubble_sizes_per_series() {
        let converted = convert_to_bubble_data(&points(), &Metric::xyr("x", "y", "r"), None);
        let sizes: Vec<f64> = converted.iter().filter_map(|p| p.symbol_size).collect();
        assert_eq!(sizes, vec![30.0, 50.0, 10.0]);
        assert_eq!(converted[1].r, Some(10.0));
    }

    #[test]
    fn test_radar_axis_union() {
        let records = vec![
            record([("a", Value::from(1)), ("b", Value::from(2)), ("c", Value::from(3))]),
            record([("a", Value::from(3)), ("b", Value::from(4)), ("c", Value::from(5))]),
        ];
        let metrics = vec![
            Metric::radar(["a", "b"], Aggregation::Sum),
            Metric::radar(["b", "c"], Aggregation::Max),
        ];

        let data = process_radar_data(&records, &metrics, None, DEFAULT_RADAR_SCALE_FACTOR);
        let names: Vec<&str> = data.indicators.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(data.series[0].values, vec![4.0, 6.0, 0.0]);
        assert_eq!(data.series[1].values, vec![0.0, 4.0, 5.0]);
        assert!((data.indicators[1].max - 7.2).abs() < 1e-9);

        let result = validate_radar_configuration(&metrics);
        assert!(result.is_valid);
        assert_eq!(result.warnings, vec![INCONSISTENT_RADAR_FIELDS.to_string()]);
    }

    #[test]
    fn test_radar_indicator_fallback() {
        let data = process_radar_data(&[], &[Metric::radar(["a"], Aggregation::Avg)], None, 1.2);
        assert_eq!(data.indicators[0].max, 100.0);
        assert_eq!(data.series[0].values, vec![0.0]);
    }

    #[test]
    fn test_radar_validation_messages() {
        let metric = Metric {
            fields: vec!["a".into()],
            ..Default::default()
        };
        let result = validate_radar_configuration(&[metric, Metric::radar(Vec::<String>::new(), Aggregation::Sum)]);
        assert_eq!(
            result.errors,
            vec![
                "Dataset 1: Aggregation is required".to_string(),
                "Dataset 2: At least one field is required".to_string(),
            ]
        );
    }

    #[test]
    fn test_dataset_names() {
        let data = process_scatter_data(&points(), &[Metric::xy("x", "y").with_label("Height"), Metric::xy("y", "x")], None);
        assert_eq!(data.series[0].name, "Height");
        assert_eq!(data.series[1].name, "Dataset 2");
    }
}
