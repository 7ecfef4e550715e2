//! Radar charts

use chart_data::DatasetData;

use super::base::{emphasis_options, label_options, series_color, series_fill};
use super::{AxisOptions, PanelView};
use crate::service::ChartDataContext;
use crate::spec::{AreaStyle, AxisName, DataPoint, Indicator, ItemStyle, RadarAxes, Series, SeriesType, Tooltip};

const DEFAULT_SHAPE: &str = "polygon";
const DEFAULT_SPLIT_NUMBER: u32 = 5;

pub(super) fn axes(context: &ChartDataContext, _view: &PanelView<'_>) -> AxisOptions {
    let indicator = match context.dataset {
        Some(DatasetData::Radar(ref radar)) => radar
            .indicators
            .iter()
            .map(|i| Indicator {
                name: i.name.clone(),
                max: i.max,
            })
            .collect(),
        _ => Vec::new(),
    };
    let params = &context.params;

    AxisOptions {
        radar: Some(RadarAxes {
            indicator,
            shape: params.radar_shape.clone().unwrap_or_else(|| DEFAULT_SHAPE.to_string()),
            split_number: params.radar_split_number.unwrap_or(DEFAULT_SPLIT_NUMBER),
            axis_name: AxisName {
                show: params.show_axis_names.unwrap_or(true),
            },
        }),
        ..Default::default()
    }
}

pub(super) fn tooltip(_context: &ChartDataContext) -> Tooltip {
    Tooltip::item()
}

/// A single radar series holding one polygon per dataset
pub(super) fn series(context: &ChartDataContext, _view: &PanelView<'_>) -> Vec<Series> {
    let Some(DatasetData::Radar(ref radar)) = context.dataset else {
        return Vec::new();
    };
    if radar.series.is_empty() {
        return Vec::new();
    }
    let params = &context.params;

    let data = radar
        .series
        .iter()
        .enumerate()
        .map(|(index, dataset)| DataPoint::Radar {
            name: dataset.name.clone(),
            value: dataset.values.clone(),
            item_style: Some(ItemStyle {
                color: Some(series_fill(params, &series_color(context, dataset.metric_index, index, false))),
                opacity: None,
            }),
        })
        .collect();

    let name = params.title.clone().unwrap_or_else(|| "Radar".to_string());
    let mut series = Series::new(name, SeriesType::Radar, data);
    series.area_style = params.opacity.map(|opacity| AreaStyle {
        color: None,
        opacity: Some(opacity),
    });
    series.label = label_options(context, 0);
    series.emphasis = emphasis_options(params);
    vec![series]
}
