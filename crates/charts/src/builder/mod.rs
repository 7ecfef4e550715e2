//! Specification builders
//!
//! One driver, [`build`], assembles every specification:
//! base options, then axes, then tooltip, then series, then advanced
//! pass-through. What differs per chart kind lives in a [`BuilderFns`]
//! table entry selected by [`builder_for`].

mod axis;
mod base;
mod pie;
mod radar;
mod scatter;

use chart_data::{BucketedData, SplitType};
use serde_json::Value as JsonValue;

use crate::config::ChartKind;
use crate::error::ChartResult;
use crate::service::ChartDataContext;
use crate::spec::{Axis, ChartSpecification, Grid, RadarAxes, Series, Tooltip};

pub use base::{
    emphasis_options, label_options, legend_options, mark_area_options, mark_line_options, series_color,
    series_fill,
};

/// Coordinate-system blocks a builder contributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisOptions {
    pub x_axis: Option<Axis>,
    pub y_axis: Option<Axis>,
    pub grid: Option<Grid>,
    pub radar: Option<RadarAxes>,
}

/// The slice of a context one specification is built from
#[derive(Debug, Clone, Copy)]
pub struct PanelView<'a> {
    pub title: Option<&'a str>,
    pub labels: &'a [String],
    pub data: Option<&'a BucketedData>,
}

impl<'a> PanelView<'a> {
    /// The first panel, or the whole dataset for dataset-shaped charts
    pub fn primary(context: &'a ChartDataContext) -> Self {
        Self {
            title: None,
            labels: &context.labels,
            data: context.processed_data.as_ref().and_then(|p| p.primary()),
        }
    }
}

pub type AxisFn = fn(&ChartDataContext, &PanelView<'_>) -> AxisOptions;
pub type TooltipFn = fn(&ChartDataContext) -> Tooltip;
pub type SeriesFn = fn(&ChartDataContext, &PanelView<'_>) -> Vec<Series>;

/// Per-kind steps plugged into the shared driver
#[derive(Clone, Copy)]
pub struct BuilderFns {
    pub axes: AxisFn,
    pub tooltip: TooltipFn,
    pub series: SeriesFn,
}

static CARTESIAN: BuilderFns = BuilderFns {
    axes: axis::axes,
    tooltip: axis::tooltip,
    series: axis::series,
};

static PIE: BuilderFns = BuilderFns {
    axes: pie::axes,
    tooltip: pie::tooltip,
    series: pie::series,
};

static SCATTER: BuilderFns = BuilderFns {
    axes: scatter::axes,
    tooltip: scatter::tooltip,
    series: scatter::series,
};

static RADAR: BuilderFns = BuilderFns {
    axes: radar::axes,
    tooltip: radar::tooltip,
    series: radar::series,
};

pub fn builder_for(kind: ChartKind) -> &'static BuilderFns {
    match kind {
        ChartKind::Bar | ChartKind::Line | ChartKind::Area => &CARTESIAN,
        ChartKind::Pie => &PIE,
        ChartKind::Scatter | ChartKind::Bubble => &SCATTER,
        ChartKind::Radar => &RADAR,
    }
}

/// Assemble a specification around already-built series
pub fn build(context: &ChartDataContext, view: &PanelView<'_>, series: Vec<Series>) -> ChartSpecification {
    let fns = builder_for(context.kind);

    let mut spec = base::base_options(context, view, &series);
    let axes = (fns.axes)(context, view);
    spec.x_axis = axes.x_axis;
    spec.y_axis = axes.y_axis;
    spec.grid = axes.grid;
    spec.radar = axes.radar;
    spec.tooltip = Some((fns.tooltip)(context));
    spec.series = series;

    base::apply_advanced(&mut spec, &context.params);
    spec
}

/// Series for one panel, one per metric or per dataset
pub fn build_series(context: &ChartDataContext, view: &PanelView<'_>) -> Vec<Series> {
    (builder_for(context.kind).series)(context, view)
}

/// Build the specification for the first panel.
///
/// An invalid context yields an empty specification; callers check
/// `context.validation` to tell the two apart.
pub fn build_chart_specification(context: &ChartDataContext) -> ChartSpecification {
    if !context.validation.is_valid {
        tracing::debug!(kind = %context.kind, errors = ?context.validation.errors, "skipping invalid chart");
        return ChartSpecification::default();
    }
    let view = PanelView::primary(context);
    let series = build_series(context, &view);
    build(context, &view, series)
}

/// One specification per panel for split rows and split charts,
/// otherwise a single specification
pub fn build_panel_specifications(context: &ChartDataContext) -> Vec<ChartSpecification> {
    let processed = match context.processed_data {
        Some(ref processed)
            if context.validation.is_valid
                && matches!(processed.split_type, Some(SplitType::Rows | SplitType::Chart)) =>
        {
            processed
        }
        _ => return vec![build_chart_specification(context)],
    };

    processed
        .panels
        .iter()
        .map(|panel| {
            let view = PanelView {
                title: panel.title.as_deref(),
                labels: &panel.data.labels,
                data: Some(&panel.data),
            };
            let series = build_series(context, &view);
            build(context, &view, series)
        })
        .collect()
}

/// Serialized output for a context: one specification object, or an
/// array of them when the chart is split into panels
pub fn specification_json(context: &ChartDataContext) -> ChartResult<JsonValue> {
    let specs = build_panel_specifications(context);
    let mut values = specs.iter().map(ChartSpecification::to_json).collect::<ChartResult<Vec<_>>>()?;
    if values.len() == 1 {
        Ok(values.remove(0))
    } else {
        Ok(JsonValue::Array(values))
    }
}
