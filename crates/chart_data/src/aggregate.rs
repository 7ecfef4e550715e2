//! Multi-bucket processor
//!
//! Turns `(records, buckets, metrics)` into ordered category labels and one
//! value array per series. The first non-split bucket drives the category
//! axis. The first split bucket fans out in two phases: records are first
//! partitioned by the split field's distinct values, then the ordinary
//! bucket/metric pipeline runs once per partition.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::bucket::{BucketSpec, BucketType, DateInterval, SortOrder, SplitType};
use crate::metric::{aggregate, Metric};
use crate::record::{format_number, Record};

/// Label used for the single category when no axis bucket is configured
pub const ALL_LABEL: &str = "All";

/// Upper bound on synthesized empty intervals when filling histogram gaps
const MAX_FILLED_BUCKETS: i64 = 1_000;

/// One series of aggregated values, aligned with the panel's labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedSeries {
    pub name: String,
    pub metric_index: usize,
    pub split_value: Option<String>,
    pub values: Vec<f64>,
}

/// Labels plus series for one chart panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketedData {
    pub labels: Vec<String>,
    pub series: Vec<AggregatedSeries>,
}

/// One rendered chart; split rows/charts produce several
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub title: Option<String>,
    pub data: BucketedData,
}

/// Output of the multi-bucket processor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedData {
    pub split_type: Option<SplitType>,
    pub panels: Vec<Panel>,
    pub warnings: Vec<String>,
}

impl ProcessedData {
    /// The first panel's data
    pub fn primary(&self) -> Option<&BucketedData> {
        self.panels.first().map(|p| &p.data)
    }

    pub fn labels(&self) -> &[String] {
        self.primary().map(|d| d.labels.as_slice()).unwrap_or(&[])
    }
}

/// A category and the indices of the records that fall in it
#[derive(Debug, Clone)]
struct Group {
    label: String,
    members: Vec<usize>,
}

/// Run the full bucket/metric pipeline over already-filtered records
pub fn process_buckets(records: &[Record], buckets: &[BucketSpec], metrics: &[Metric]) -> ProcessedData {
    let usable: Vec<&BucketSpec> = buckets.iter().filter(|b| b.has_field()).collect();
    let axis = usable.iter().copied().find(|b| !b.bucket_type.is_split());
    let split = usable.iter().copied().find(|b| b.bucket_type.is_split());

    let mut warnings = Vec::new();
    let used = axis.iter().count() + split.iter().count();
    if usable.len() > used {
        let message = format!(
            "{} additional bucket(s) ignored; only one axis bucket and one split bucket are used",
            usable.len() - used
        );
        tracing::warn!("{}", message);
        warnings.push(message);
    }

    // Per-metric dataset filters are evaluated once per record
    let accepted: Vec<Vec<bool>> = metrics
        .iter()
        .map(|metric| records.iter().map(|r| metric.accepts(r)).collect())
        .collect();

    let all: Vec<usize> = (0..records.len()).collect();

    let (split_type, panels) = match split.and_then(|s| s.effective_split_type().map(|t| (s, t))) {
        None => {
            let groups = compute_groups(records, &all, axis);
            let series = metrics
                .iter()
                .enumerate()
                .map(|(index, metric)| AggregatedSeries {
                    name: metric.series_name(),
                    metric_index: index,
                    split_value: None,
                    values: metric_values(records, &groups, metric, |i| accepted[index][i]),
                })
                .collect();
            (None, vec![panel(None, &groups, series)])
        }
        Some((split_bucket, SplitType::Series)) => {
            let groups = compute_groups(records, &all, axis);
            let partitions = partition_records(records, split_bucket);
            let mut series = Vec::with_capacity(partitions.len() * metrics.len());
            for partition in &partitions {
                let mut in_partition = vec![false; records.len()];
                for &i in &partition.members {
                    in_partition[i] = true;
                }
                for (index, metric) in metrics.iter().enumerate() {
                    series.push(AggregatedSeries {
                        name: format!("{}: {}", partition.label, metric.series_name()),
                        metric_index: index,
                        split_value: Some(partition.label.clone()),
                        values: metric_values(records, &groups, metric, |i| {
                            in_partition[i] && accepted[index][i]
                        }),
                    });
                }
            }
            (Some(SplitType::Series), vec![panel(None, &groups, series)])
        }
        Some((split_bucket, split_type)) => {
            let panels = partition_records(records, split_bucket)
                .into_iter()
                .map(|partition| {
                    let groups = compute_groups(records, &partition.members, axis);
                    let series = metrics
                        .iter()
                        .enumerate()
                        .map(|(index, metric)| AggregatedSeries {
                            name: metric.series_name(),
                            metric_index: index,
                            split_value: Some(partition.label.clone()),
                            values: metric_values(records, &groups, metric, |i| accepted[index][i]),
                        })
                        .collect();
                    panel(Some(partition.label), &groups, series)
                })
                .collect();
            (Some(split_type), panels)
        }
    };

    tracing::debug!(
        records = records.len(),
        panels = panels.len(),
        metrics = metrics.len(),
        "processed buckets"
    );

    ProcessedData {
        split_type,
        panels,
        warnings,
    }
}

fn panel(title: Option<String>, groups: &[Group], series: Vec<AggregatedSeries>) -> Panel {
    Panel {
        title,
        data: BucketedData {
            labels: groups.iter().map(|g| g.label.clone()).collect(),
            series,
        },
    }
}

fn metric_values<F>(records: &[Record], groups: &[Group], metric: &Metric, include: F) -> Vec<f64>
where
    F: Fn(usize) -> bool,
{
    let agg = metric.aggregation();
    groups
        .iter()
        .map(|group| {
            let members = group
                .members
                .iter()
                .copied()
                .filter(|&i| include(i))
                .map(|i| &records[i]);
            aggregate(members, &metric.field, agg)
        })
        .collect()
}

/// Phase one of a split: distinct split values, most frequent first
fn partition_records(records: &[Record], split: &BucketSpec) -> Vec<Group> {
    let all: Vec<usize> = (0..records.len()).collect();
    let mut partitions = terms_groups(records, &all, &split.field);
    order_by_count(&mut partitions, split.order);
    if let Some(size) = split.size {
        partitions.truncate(size);
    }
    partitions
}

fn compute_groups(records: &[Record], subset: &[usize], axis: Option<&BucketSpec>) -> Vec<Group> {
    let Some(bucket) = axis else {
        return vec![Group {
            label: ALL_LABEL.to_string(),
            members: subset.to_vec(),
        }];
    };

    let mut groups = match bucket.bucket_type {
        BucketType::Histogram => histogram_groups(records, subset, bucket),
        BucketType::DateHistogram => date_histogram_groups(records, subset, bucket),
        BucketType::Range => range_groups(records, subset, bucket),
        _ => {
            let mut groups = terms_groups(records, subset, &bucket.field);
            order_by_count(&mut groups, bucket.order);
            if let Some(size) = bucket.size {
                groups.truncate(size);
            }
            groups
        }
    };

    groups.retain(|g| g.members.len() >= bucket.min_doc_count);
    groups
}

/// Distinct stringified values in order of first appearance
fn terms_groups(records: &[Record], subset: &[usize], field: &str) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for &i in subset {
        let Some(value) = records[i].get(field).filter(|v| !v.is_null()) else {
            continue;
        };
        let key = value.to_string_value();
        match positions.get(&key) {
            Some(&pos) => groups[pos].members.push(i),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(Group {
                    label: key,
                    members: vec![i],
                });
            }
        }
    }

    groups
}

// sort_by is stable, so ties keep first-appearance order
fn order_by_count(groups: &mut [Group], order: SortOrder) {
    match order {
        SortOrder::Desc => groups.sort_by(|a, b| b.members.len().cmp(&a.members.len())),
        SortOrder::Asc => groups.sort_by(|a, b| a.members.len().cmp(&b.members.len())),
    }
}

/// Histogram slot, `floor(value / interval)`, ordered with `total_cmp`
#[derive(Debug, Clone, Copy)]
struct Slot(f64);

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0).is_eq()
    }
}

impl Eq for Slot {}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

fn histogram_groups(records: &[Record], subset: &[usize], bucket: &BucketSpec) -> Vec<Group> {
    let interval = match bucket.interval {
        Some(i) if i > 0.0 => i,
        _ => return Vec::new(),
    };

    let mut slots: BTreeMap<Slot, Vec<usize>> = BTreeMap::new();
    for &i in subset {
        let value = records[i].get(&bucket.field).map_or(f64::NAN, |v| v.to_number());
        let slot = (value / interval).floor();
        if slot.is_finite() {
            // -0.0 and 0.0 share a slot
            slots.entry(Slot(slot + 0.0)).or_default().push(i);
        }
    }

    if bucket.min_doc_count == 0 {
        if let (Some(&first), Some(&last)) = (slots.keys().next(), slots.keys().next_back()) {
            let span = last.0 - first.0;
            if span <= MAX_FILLED_BUCKETS as f64 {
                for step in 0..=span as i64 {
                    slots.entry(Slot(first.0 + step as f64)).or_default();
                }
            } else {
                tracing::warn!(field = %bucket.field, "histogram range too wide to fill empty intervals");
            }
        }
    }

    slots
        .into_iter()
        .map(|(slot, members)| Group {
            label: format_number(slot.0 * interval),
            members,
        })
        .collect()
}

fn date_histogram_groups(records: &[Record], subset: &[usize], bucket: &BucketSpec) -> Vec<Group> {
    let Some(interval) = bucket.date_interval else {
        return Vec::new();
    };

    let mut slots: BTreeMap<NaiveDateTime, Vec<usize>> = BTreeMap::new();
    for &i in subset {
        if let Some(dt) = records[i].get(&bucket.field).and_then(|v| v.as_datetime()) {
            slots.entry(truncate_datetime(dt, interval)).or_default().push(i);
        }
    }

    if bucket.min_doc_count == 0 {
        if let (Some(&first), Some(&last)) = (slots.keys().next(), slots.keys().next_back()) {
            let mut current = first;
            let mut filled = 0;
            while current < last && filled < MAX_FILLED_BUCKETS {
                slots.entry(current).or_default();
                match next_boundary(current, interval) {
                    Some(next) => current = next,
                    None => break,
                }
                filled += 1;
            }
        }
    }

    let format = interval.label_format();
    slots
        .into_iter()
        .map(|(key, members)| Group {
            label: key.format(format).to_string(),
            members,
        })
        .collect()
}

fn range_groups(records: &[Record], subset: &[usize], bucket: &BucketSpec) -> Vec<Group> {
    let ranges = bucket.ranges.as_deref().unwrap_or_default();
    let mut groups: Vec<Group> = ranges
        .iter()
        .map(|range| Group {
            label: range.display_label(),
            members: Vec::new(),
        })
        .collect();

    for &i in subset {
        let value = records[i].get(&bucket.field).map_or(f64::NAN, |v| v.to_number());
        if let Some(pos) = ranges.iter().position(|range| range.contains(value)) {
            groups[pos].members.push(i);
        }
    }

    groups
}

/// Truncate a timestamp to the start of its interval (weeks start on Monday)
pub fn truncate_datetime(dt: NaiveDateTime, interval: DateInterval) -> NaiveDateTime {
    let date = dt.date();
    match interval {
        DateInterval::Minute => date.and_time(
            NaiveTime::from_hms_opt(dt.hour(), dt.minute(), 0).unwrap_or(NaiveTime::MIN),
        ),
        DateInterval::Hour => {
            date.and_time(NaiveTime::from_hms_opt(dt.hour(), 0, 0).unwrap_or(NaiveTime::MIN))
        }
        DateInterval::Day => date.and_time(NaiveTime::MIN),
        DateInterval::Week => {
            let offset = date.weekday().num_days_from_monday() as i64;
            (date - Duration::days(offset)).and_time(NaiveTime::MIN)
        }
        DateInterval::Month => date.with_day(1).unwrap_or(date).and_time(NaiveTime::MIN),
        DateInterval::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)
            .unwrap_or(date)
            .and_time(NaiveTime::MIN),
    }
}

fn next_boundary(dt: NaiveDateTime, interval: DateInterval) -> Option<NaiveDateTime> {
    match interval {
        DateInterval::Minute => dt.checked_add_signed(Duration::minutes(1)),
        DateInterval::Hour => dt.checked_add_signed(Duration::hours(1)),
        DateInterval::Day => dt.checked_add_signed(Duration::days(1)),
        DateInterval::Week => dt.checked_add_signed(Duration::weeks(1)),
        DateInterval::Month => dt.checked_add_months(Months::new(1)),
        DateInterval::Year => dt.checked_add_months(Months::new(12)),
    }
}
