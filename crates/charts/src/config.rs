//! Chart kinds and declarative chart configuration

use std::str::FromStr;

use chart_data::{BucketSpec, Filter, Metric, MetricStyle};
use serde::{Deserialize, Serialize};

use crate::error::ChartError;
use crate::params::WidgetParams;

/// Types of charts supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Area,
    Pie,
    Scatter,
    Bubble,
    Radar,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Area,
        ChartKind::Pie,
        ChartKind::Scatter,
        ChartKind::Bubble,
        ChartKind::Radar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Area => "area",
            ChartKind::Pie => "pie",
            ChartKind::Scatter => "scatter",
            ChartKind::Bubble => "bubble",
            ChartKind::Radar => "radar",
        }
    }

    /// Scatter, bubble and radar map rows straight to points or axes
    pub fn is_dataset_shaped(&self) -> bool {
        matches!(self, ChartKind::Scatter | ChartKind::Bubble | ChartKind::Radar)
    }

    /// Bar, line and area share a category axis
    pub fn is_cartesian(&self) -> bool {
        matches!(self, ChartKind::Bar | ChartKind::Line | ChartKind::Area)
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        ChartKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| ChartError::InvalidChartType(s.to_string()))
    }
}

/// Declarative configuration for one chart widget
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
    pub metrics: Vec<Metric>,
    pub buckets: Vec<BucketSpec>,
    pub metric_styles: Vec<MetricStyle>,
    pub global_filters: Vec<Filter>,
    pub widget_params: WidgetParams,
}

impl ChartConfig {
    pub fn new(metrics: Vec<Metric>, buckets: Vec<BucketSpec>) -> Self {
        Self {
            metrics,
            buckets,
            ..Default::default()
        }
    }

    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.global_filters = filters;
        self
    }

    pub fn with_styles(mut self, styles: Vec<MetricStyle>) -> Self {
        self.metric_styles = styles;
        self
    }

    pub fn with_params(mut self, params: WidgetParams) -> Self {
        self.widget_params = params;
        self
    }

    pub fn has_buckets(&self) -> bool {
        !self.buckets.is_empty()
    }
}
