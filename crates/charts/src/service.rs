//! Chart data service
//!
//! Assembles the [`ChartDataContext`] every builder consumes: filtered rows,
//! bucketed or dataset-shaped data, labels, resolved widget params and the
//! validation outcome.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chart_data::{
    apply_all_filters, process_bubble_data, process_buckets, process_radar_data, process_scatter_data,
    validate_bubble_configuration, validate_bucket, validate_filter, validate_radar_configuration,
    validate_scatter_configuration, DatasetData, Metric, MetricStyle, ProcessedData, Record, ValidationResult,
};
use serde::Serialize;

use crate::config::{ChartConfig, ChartKind};
use crate::params::{resolve_widget_params, WidgetParams};

/// Per-render working set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataContext {
    pub kind: ChartKind,
    pub filtered_data: Vec<Record>,
    pub processed_data: Option<ProcessedData>,
    pub labels: Vec<String>,
    pub metrics: Vec<Metric>,
    pub metric_styles: Vec<MetricStyle>,
    pub params: WidgetParams,
    pub validation: ValidationResult,
    pub dataset: Option<DatasetData>,
}

impl ChartDataContext {
    /// Style configured for the metric at `index`
    pub fn style(&self, index: usize) -> Option<&MetricStyle> {
        self.metric_styles.get(index)
    }

    pub fn is_valid(&self) -> bool {
        self.validation.is_valid
    }

    /// Valid configuration but nothing to draw
    pub fn has_no_data(&self) -> bool {
        self.filtered_data.is_empty()
    }
}

/// The minimum gate for bucketed charts
pub fn validate_bucket_chart_config(config: &ChartConfig) -> ValidationResult {
    let mut result = ValidationResult::valid();
    if config.metrics.is_empty() {
        result.add_error("At least one metric is required");
    }
    if !config.buckets.iter().any(|b| b.has_field()) {
        result.add_error("At least one bucket with a field is required");
    }
    for bucket in config.buckets.iter().filter(|b| b.has_field()) {
        result = result.merge(validate_bucket(bucket));
    }
    result.merge(filter_warnings(config))
}

/// The per-shape gate for scatter, bubble and radar charts
pub fn validate_dataset_config(kind: ChartKind, config: &ChartConfig) -> ValidationResult {
    let result = match kind {
        ChartKind::Bubble => validate_bubble_configuration(&config.metrics),
        ChartKind::Radar => validate_radar_configuration(&config.metrics),
        _ => validate_scatter_configuration(&config.metrics),
    };
    result.merge(filter_warnings(config))
}

/// Incomplete filters are skipped, so they only warn
fn filter_warnings(config: &ChartConfig) -> ValidationResult {
    let mut result = ValidationResult::valid();
    let filters = config
        .global_filters
        .iter()
        .chain(config.metrics.iter().flat_map(|m| m.dataset_filters.iter()));
    for filter in filters {
        for message in validate_filter(filter).errors {
            result.add_warning(message);
        }
    }
    result
}

pub fn validate_chart_config(kind: ChartKind, config: &ChartConfig) -> ValidationResult {
    if kind.is_dataset_shaped() {
        validate_dataset_config(kind, config)
    } else {
        validate_bucket_chart_config(config)
    }
}

/// Global filters, then bucketing when at least one bucket is configured
pub fn process_chart_data(records: &[Record], config: &ChartConfig) -> (Vec<Record>, Option<ProcessedData>) {
    let filtered = apply_all_filters(records, Some(&config.global_filters), None);
    let processed = config
        .has_buckets()
        .then(|| process_buckets(&filtered, &config.buckets, &config.metrics));
    (filtered, processed)
}

/// Build a context with the built-in component defaults
pub fn create_data_context(
    kind: ChartKind,
    records: &[Record],
    config: &ChartConfig,
    call_site: Option<&WidgetParams>,
) -> ChartDataContext {
    create_data_context_with_defaults(kind, records, config, &WidgetParams::component_defaults(), call_site)
}

/// Build a context over an explicit component-defaults layer
pub fn create_data_context_with_defaults(
    kind: ChartKind,
    records: &[Record],
    config: &ChartConfig,
    component_defaults: &WidgetParams,
    call_site: Option<&WidgetParams>,
) -> ChartDataContext {
    let params = resolve_widget_params(kind, component_defaults, &config.widget_params, call_site);
    let mut validation = validate_chart_config(kind, config);

    let (filtered_data, processed_data, dataset) = if kind.is_dataset_shaped() {
        let filtered = apply_all_filters(records, Some(&config.global_filters), None);
        let dataset = match kind {
            ChartKind::Radar => {
                let scale = params
                    .radar_scale_factor
                    .unwrap_or(chart_data::dataset::DEFAULT_RADAR_SCALE_FACTOR);
                DatasetData::Radar(process_radar_data(&filtered, &config.metrics, None, scale))
            }
            ChartKind::Bubble => DatasetData::Points(process_bubble_data(&filtered, &config.metrics, None)),
            _ => DatasetData::Points(process_scatter_data(&filtered, &config.metrics, None)),
        };
        (filtered, None, Some(dataset))
    } else {
        let (filtered, processed) = process_chart_data(records, config);
        (filtered, processed, None)
    };

    if let Some(ref processed) = processed_data {
        for warning in &processed.warnings {
            validation.add_warning(warning.clone());
        }
    }

    let labels = match processed_data {
        Some(ref processed) => processed.labels().to_vec(),
        None => labels_from_rows(&filtered_data, params.label_field.as_deref()),
    };

    for warning in &validation.warnings {
        tracing::debug!(kind = %kind, "{}", warning);
    }
    tracing::debug!(
        kind = %kind,
        records = records.len(),
        filtered = filtered_data.len(),
        labels = labels.len(),
        valid = validation.is_valid,
        "created chart data context"
    );

    ChartDataContext {
        kind,
        filtered_data,
        processed_data,
        labels,
        metrics: config.metrics.clone(),
        metric_styles: config.metric_styles.clone(),
        params,
        validation,
        dataset,
    }
}

fn labels_from_rows(rows: &[Record], label_field: Option<&str>) -> Vec<String> {
    let Some(field) = label_field.filter(|f| !f.is_empty()) else {
        return Vec::new();
    };
    rows.iter()
        .map(|row| row.get(field).map(|v| v.to_string_value()).unwrap_or_default())
        .collect()
}

/// Bounded FIFO of recent contexts, keyed by their serialized inputs
#[derive(Debug)]
struct ContextCache {
    capacity: usize,
    entries: HashMap<String, Arc<ChartDataContext>>,
    order: VecDeque<String>,
}

impl ContextCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&self, key: &str) -> Option<Arc<ChartDataContext>> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: String, context: Arc<ChartDataContext>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key.clone(), context).is_none() {
            self.order.push_back(key);
        }
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }
}

/// Builds contexts, optionally memoizing identical inputs
#[derive(Debug)]
pub struct ChartDataService {
    component_defaults: WidgetParams,
    cache: Option<Mutex<ContextCache>>,
}

impl Default for ChartDataService {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartDataService {
    pub fn new() -> Self {
        Self {
            component_defaults: WidgetParams::component_defaults(),
            cache: None,
        }
    }

    /// Memoize up to `capacity` contexts keyed by their inputs
    pub fn with_cache(capacity: usize) -> Self {
        Self {
            cache: Some(Mutex::new(ContextCache::new(capacity))),
            ..Self::new()
        }
    }

    /// Replace the component-defaults layer of the param cascade
    pub fn with_component_defaults(mut self, defaults: WidgetParams) -> Self {
        self.component_defaults = WidgetParams::component_defaults().merge(&defaults);
        self
    }

    pub fn component_defaults(&self) -> &WidgetParams {
        &self.component_defaults
    }

    pub fn create_context(
        &self,
        kind: ChartKind,
        records: &[Record],
        config: &ChartConfig,
        call_site: Option<&WidgetParams>,
    ) -> Arc<ChartDataContext> {
        let build = || {
            Arc::new(create_data_context_with_defaults(
                kind,
                records,
                config,
                &self.component_defaults,
                call_site,
            ))
        };

        let Some(ref cache) = self.cache else {
            return build();
        };
        let Some(key) = cache_key(kind, records, config, &self.component_defaults, call_site) else {
            return build();
        };

        if let Some(hit) = cache.lock().unwrap_or_else(|e| e.into_inner()).get(&key) {
            tracing::trace!(kind = %kind, "chart context cache hit");
            return hit;
        }

        let context = build();
        cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, Arc::clone(&context));
        context
    }

    pub fn cached_len(&self) -> usize {
        self.cache
            .as_ref()
            .map_or(0, |c| c.lock().unwrap_or_else(|e| e.into_inner()).entries.len())
    }
}

#[derive(Serialize)]
struct CacheKey<'a> {
    kind: ChartKind,
    records: &'a [Record],
    config: &'a ChartConfig,
    defaults: &'a WidgetParams,
    call_site: Option<&'a WidgetParams>,
}

fn cache_key(
    kind: ChartKind,
    records: &[Record],
    config: &ChartConfig,
    defaults: &WidgetParams,
    call_site: Option<&WidgetParams>,
) -> Option<String> {
    let key = CacheKey {
        kind,
        records,
        config,
        defaults,
        call_site,
    };
    serde_json::to_string(&key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chart_data::{record, Aggregation, BucketSpec, BucketType, Filter, Value};

    fn sales() -> Vec<Record> {
        vec![
            record([("month", Value::from("Jan")), ("sales", Value::from(100)), ("region", Value::from("East"))]),
            record([("month", Value::from("Feb")), ("sales", Value::from(200)), ("region", Value::from("West"))]),
        ]
    }

    fn bar_config() -> ChartConfig {
        ChartConfig::new(
            vec![Metric::new("sales", Aggregation::Sum)],
            vec![BucketSpec::new(BucketType::Terms, "month")],
        )
    }

    #[test]
    fn test_validate_bucket_chart_config() {
        let result = validate_bucket_chart_config(&ChartConfig::default());
        assert_eq!(
            result.errors,
            vec![
                "At least one metric is required".to_string(),
                "At least one bucket with a field is required".to_string(),
            ]
        );

        let config = ChartConfig::new(
            vec![Metric::new("sales", Aggregation::Sum)],
            vec![BucketSpec::new(BucketType::Histogram, "sales")],
        );
        let result = validate_bucket_chart_config(&config);
        assert_eq!(result.errors, vec!["Histogram interval must be greater than 0".to_string()]);
    }

    #[test]
    fn test_unknown_filter_operator_warns() {
        let config = bar_config().with_filters(vec![Filter::new("region", "resembles", "East")]);
        let result = validate_bucket_chart_config(&config);
        assert!(result.is_valid);
        assert_eq!(result.warnings, vec!["Unknown filter operator: resembles".to_string()]);
    }

    #[test]
    fn test_process_chart_data_without_buckets() {
        let config = ChartConfig::new(vec![Metric::new("sales", Aggregation::Sum)], vec![]);
        let (filtered, processed) = process_chart_data(&sales(), &config);
        assert_eq!(filtered.len(), 2);
        assert!(processed.is_none());
    }

    #[test]
    fn test_context_labels_from_label_field() {
        let config = ChartConfig::new(vec![Metric::new("sales", Aggregation::Sum)], vec![]).with_params(WidgetParams {
            label_field: Some("month".into()),
            ..Default::default()
        });
        let context = create_data_context(ChartKind::Pie, &sales(), &config, None);
        assert_eq!(context.labels, vec!["Jan".to_string(), "Feb".to_string()]);
        assert!(!context.is_valid());
    }

    #[test]
    fn test_context_applies_global_filters() {
        let config = bar_config().with_filters(vec![Filter::new("region", "equals", "West")]);
        let context = create_data_context(ChartKind::Bar, &sales(), &config, None);
        assert!(context.is_valid());
        assert_eq!(context.filtered_data.len(), 1);
        assert_eq!(context.labels, vec!["Feb".to_string()]);
    }

    #[test]
    fn test_dataset_context() {
        let config = ChartConfig::new(vec![Metric::xy("sales", "sales")], vec![]);
        let context = create_data_context(ChartKind::Scatter, &sales(), &config, None);
        assert!(context.is_valid());
        assert!(context.processed_data.is_none());
        match context.dataset {
            Some(DatasetData::Points(ref points)) => assert_eq!(points.series[0].points.len(), 2),
            ref other => panic!("unexpected dataset {:?}", other),
        }

        let context = create_data_context(ChartKind::Radar, &sales(), &ChartConfig::default(), None);
        assert_eq!(context.validation.errors, vec!["At least one dataset must be configured".to_string()]);
    }

    #[test]
    fn test_call_site_params_win() {
        let config = bar_config().with_params(WidgetParams {
            title: Some("Configured".into()),
            ..Default::default()
        });
        let call_site = WidgetParams {
            title: Some("Call site".into()),
            ..Default::default()
        };
        let context = create_data_context(ChartKind::Bar, &sales(), &config, Some(&call_site));
        assert_eq!(context.params.title.as_deref(), Some("Call site"));
        assert_eq!(context.params.axis_pointer.as_deref(), Some("shadow"));
    }

    #[test]
    fn test_service_cache_shares_contexts() {
        let service = ChartDataService::with_cache(1);
        let records = sales();
        let first = service.create_context(ChartKind::Bar, &records, &bar_config(), None);
        let second = service.create_context(ChartKind::Bar, &records, &bar_config(), None);
        assert!(Arc::ptr_eq(&first, &second));

        let third = service.create_context(ChartKind::Line, &records, &bar_config(), None);
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(service.cached_len(), 1);
    }

    #[test]
    fn test_context_cache_matches_whole_key() {
        let records = sales();
        let bar = cache_key(ChartKind::Bar, &records, &bar_config(), &WidgetParams::default(), None).unwrap();
        let line = cache_key(ChartKind::Line, &records, &bar_config(), &WidgetParams::default(), None).unwrap();
        assert_ne!(bar, line);

        let context = Arc::new(create_data_context(ChartKind::Bar, &records, &bar_config(), None));
        let mut cache = ContextCache::new(2);
        cache.insert(bar.clone(), Arc::clone(&context));
        assert!(cache.get(&line).is_none());
        assert!(Arc::ptr_eq(&cache.get(&bar).unwrap(), &context));

        cache.insert(line.clone(), Arc::clone(&context));
        cache.insert("other".to_string(), Arc::clone(&context));
        assert!(cache.get(&bar).is_none());
        assert_eq!(cache.entries.len(), 2);
    }

    #[test]
    fn test_service_without_cache_rebuilds() {
        let service = ChartDataService::new();
        let records = sales();
        let first = service.create_context(ChartKind::Bar, &records, &bar_config(), None);
        let second = service.create_context(ChartKind::Bar, &records, &bar_config(), None);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(service.cached_len(), 0);
    }

    #[test]
    fn test_service_component_defaults() {
        let service = ChartDataService::new().with_component_defaults(WidgetParams {
            show_values: Some(true),
            ..Default::default()
        });
        let context = service.create_context(ChartKind::Bar, &sales(), &bar_config(), None);
        assert_eq!(context.params.show_values, Some(true));
        assert_eq!(context.params.show_legend, Some(true));
    }
}
