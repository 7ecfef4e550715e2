//! Category-axis charts: bar, line and area

use chart_data::SeriesType as StyleSeriesType;

use super::base::{
    emphasis_options, label_options, mark_area_options, mark_line_options, series_color, series_fill,
    series_opacity,
};
use super::{AxisOptions, PanelView};
use crate::config::ChartKind;
use crate::service::ChartDataContext;
use crate::spec::{AreaStyle, Axis, DataPoint, Grid, ItemStyle, Series, SeriesType, Tooltip};
use crate::styles::Fill;

const STACK_ID: &str = "total";

pub(super) fn axes(context: &ChartDataContext, view: &PanelView<'_>) -> AxisOptions {
    let params = &context.params;
    let category = Axis::category(view.labels.to_vec()).with_name(params.x_label.clone());
    let value = Axis::value().with_name(params.y_label.clone());

    let (x_axis, y_axis) = if params.horizontal.unwrap_or(false) {
        (value, category)
    } else {
        (category, value)
    };

    AxisOptions {
        x_axis: Some(x_axis),
        y_axis: Some(y_axis),
        grid: Some(Grid::default()),
        radar: None,
    }
}

pub(super) fn tooltip(context: &ChartDataContext) -> Tooltip {
    let pointer = match context.params.axis_pointer {
        Some(ref pointer) if !pointer.is_empty() => pointer.clone(),
        _ if context.kind == ChartKind::Bar => "shadow".to_string(),
        _ => "line".to_string(),
    };
    Tooltip::axis(pointer)
}

pub(super) fn series(context: &ChartDataContext, view: &PanelView<'_>) -> Vec<Series> {
    let Some(data) = view.data else {
        return Vec::new();
    };
    let params = &context.params;

    data.series
        .iter()
        .enumerate()
        .map(|(index, aggregated)| {
            let style = context.style(aggregated.metric_index);
            let kind = match style.and_then(|s| s.series_type) {
                Some(StyleSeriesType::Bar) => SeriesType::Bar,
                Some(StyleSeriesType::Line) => SeriesType::Line,
                None if context.kind == ChartKind::Bar => SeriesType::Bar,
                None => SeriesType::Line,
            };

            let color = series_color(context, aggregated.metric_index, index, aggregated.split_value.is_some());
            let opacity = series_opacity(context, aggregated.metric_index);
            let points = aggregated.values.iter().copied().map(DataPoint::Value).collect();

            let mut series = Series::new(aggregated.name.clone(), kind, points);
            series.stack = params.stacked.unwrap_or(false).then(|| STACK_ID.to_string());
            series.label = label_options(context, aggregated.metric_index);
            series.emphasis = emphasis_options(params);

            if kind == SeriesType::Line {
                let smooth = style.and_then(|s| s.smooth).or(params.smooth).unwrap_or(false);
                series.smooth = Some(smooth);

                let filled = context.kind == ChartKind::Area
                    || style.and_then(|s| s.area_fill).or(params.area_fill).unwrap_or(false);
                if filled {
                    series.area_style = Some(AreaStyle {
                        color: match series_fill(params, &color) {
                            Fill::Solid(_) => None,
                            gradient => Some(gradient),
                        },
                        opacity,
                    });
                }
                series.item_style = Some(ItemStyle {
                    color: Some(Fill::Solid(color)),
                    opacity: None,
                });
            } else {
                series.item_style = Some(ItemStyle {
                    color: Some(series_fill(params, &color)),
                    opacity,
                });
            }

            if index == 0 {
                series.mark_line = mark_line_options(params);
                series.mark_area = mark_area_options(params);
            }
            series
        })
        .collect()
}
