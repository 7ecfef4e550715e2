//! Pie and doughnut charts

use chart_data::format_number;

use super::base::{emphasis_options, series_opacity};
use super::{AxisOptions, PanelView};
use crate::service::ChartDataContext;
use crate::spec::{DataPoint, ItemStyle, Label, Series, SeriesType, Tooltip};

pub const PIE_TOOLTIP_FORMAT: &str = "{b}: {c} ({d}%)";
const PIE_LABEL_FORMAT: &str = "{b}: {d}%";
const OUTER_RADIUS: &str = "70%";

pub(super) fn axes(_context: &ChartDataContext, _view: &PanelView<'_>) -> AxisOptions {
    AxisOptions::default()
}

pub(super) fn tooltip(_context: &ChartDataContext) -> Tooltip {
    Tooltip::item().with_formatter(PIE_TOOLTIP_FORMAT)
}

/// One slice per label, valued by the first series
pub(super) fn series(context: &ChartDataContext, view: &PanelView<'_>) -> Vec<Series> {
    let Some(first) = view.data.and_then(|d| d.series.first()) else {
        return Vec::new();
    };
    let params = &context.params;

    let data = view
        .labels
        .iter()
        .zip(first.values.iter())
        .map(|(label, value)| DataPoint::Named {
            name: label.clone(),
            value: *value,
        })
        .collect();

    let inner = match params.inner_radius {
        Some(r) if r > 0.0 => format!("{}%", format_number(r)),
        _ => "0%".to_string(),
    };

    let mut series = Series::new(first.name.clone(), SeriesType::Pie, data);
    series.radius = Some(vec![inner, OUTER_RADIUS.to_string()]);
    series.emphasis = emphasis_options(params);
    series.item_style = series_opacity(context, first.metric_index).map(|opacity| ItemStyle {
        color: None,
        opacity: Some(opacity),
    });

    let show = context
        .style(first.metric_index)
        .and_then(|s| s.show_values)
        .or(params.show_values)
        .unwrap_or(false);
    if show {
        series.label = Some(Label {
            show,
            position: params.label_position.clone(),
            formatter: Some(PIE_LABEL_FORMAT.to_string()),
        });
    }

    vec![series]
}
