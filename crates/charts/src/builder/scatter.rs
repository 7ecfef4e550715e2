//! Scatter and bubble charts

use chart_data::{DatasetData, ScatterScales};

use super::base::{emphasis_options, label_options, series_color, series_fill, series_opacity};
use super::{AxisOptions, PanelView};
use crate::service::ChartDataContext;
use crate::spec::{Axis, DataPoint, Grid, ItemStyle, Series, SeriesType, Tooltip};

pub(super) fn axes(context: &ChartDataContext, _view: &PanelView<'_>) -> AxisOptions {
    let scales = match context.dataset {
        Some(DatasetData::Points(ref points)) => points.scales,
        _ => ScatterScales::default(),
    };
    let params = &context.params;

    AxisOptions {
        x_axis: Some(
            Axis::value()
                .with_name(params.x_label.clone())
                .with_bounds(scales.x.min, scales.x.max),
        ),
        y_axis: Some(
            Axis::value()
                .with_name(params.y_label.clone())
                .with_bounds(scales.y.min, scales.y.max),
        ),
        grid: Some(Grid::default()),
        radar: None,
    }
}

pub(super) fn tooltip(_context: &ChartDataContext) -> Tooltip {
    Tooltip::item()
}

/// One series per dataset; bubbles carry a per-point symbol size
pub(super) fn series(context: &ChartDataContext, _view: &PanelView<'_>) -> Vec<Series> {
    let Some(DatasetData::Points(ref points)) = context.dataset else {
        return Vec::new();
    };
    let params = &context.params;

    points
        .series
        .iter()
        .enumerate()
        .map(|(index, dataset)| {
            let data = dataset
                .points
                .iter()
                .map(|p| match (p.r, p.symbol_size) {
                    (Some(r), Some(size)) => DataPoint::Sized {
                        value: vec![p.x, p.y, r],
                        symbol_size: size,
                    },
                    _ => DataPoint::Coords(vec![p.x, p.y]),
                })
                .collect();

            let color = series_color(context, dataset.metric_index, index, false);
            let mut series = Series::new(dataset.name.clone(), SeriesType::Scatter, data);
            series.item_style = Some(ItemStyle {
                color: Some(series_fill(params, &color)),
                opacity: series_opacity(context, dataset.metric_index),
            });
            series.symbol_size = context.style(dataset.metric_index).and_then(|s| s.symbol_size);
            series.label = label_options(context, dataset.metric_index);
            series.emphasis = emphasis_options(params);
            series
        })
        .collect()
}
