//! Options and helpers shared by every builder
//!
//! Each decoration helper reads one advanced block and is a no-op when
//! that block is absent.

use serde_json::{json, Map, Value as JsonValue};

use super::PanelView;
use crate::params::{deep_merge, WidgetParams};
use crate::service::ChartDataContext;
use crate::spec::{
    ChartSpecification, DataPoint, Label, Legend, MarkArea, MarkAreaPoint, MarkLine, MarkLineItem, Series, Title,
};
use crate::styles::{gradient_fill, palette_color, Fill, GradientKind, DEFAULT_PALETTE};

/// Advanced keys the helpers consume
const CONSUMED_KEYS: [&str; 6] = ["toolbox", "emphasis", "gradient", "markLine", "markArea", "overrides"];

/// Advanced keys that name typed specification blocks; merged over them
const TYPED_KEYS: [&str; 9] = ["title", "legend", "tooltip", "grid", "xAxis", "yAxis", "radar", "color", "series"];

const DEFAULT_GRADIENT_END_OPACITY: f64 = 0.2;

/// Title, legend, palette and toolbox
pub(crate) fn base_options(context: &ChartDataContext, view: &PanelView<'_>, series: &[Series]) -> ChartSpecification {
    let params = &context.params;

    let title = match (params.title.as_deref(), view.title) {
        (Some(text), subtext) if !text.is_empty() => Some(Title {
            text: text.to_string(),
            subtext: subtext.map(str::to_string),
            left: None,
        }),
        (_, Some(panel)) => Some(Title {
            text: panel.to_string(),
            ..Default::default()
        }),
        _ => None,
    };

    let color = match params.palette {
        Some(ref palette) if !palette.is_empty() => palette.clone(),
        _ => DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
    };

    let toolbox = params.advanced("toolbox").and_then(|toolbox| match toolbox {
        JsonValue::Bool(true) => Some(json!({"show": true, "feature": {"saveAsImage": {}}})),
        JsonValue::Bool(false) => None,
        other => Some(other.clone()),
    });

    ChartSpecification {
        title,
        legend: legend_options(params, legend_names(series)),
        toolbox,
        color,
        ..Default::default()
    }
}

/// Pie slices and radar polygons are legend entries; otherwise series are
fn legend_names(series: &[Series]) -> Vec<String> {
    let mut names = Vec::new();
    for s in series {
        let mut named = false;
        for point in &s.data {
            match point {
                DataPoint::Named { name, .. } | DataPoint::Radar { name, .. } => {
                    names.push(name.clone());
                    named = true;
                }
                _ => {}
            }
        }
        if !named {
            names.push(s.name.clone());
        }
    }
    names
}

pub fn legend_options(params: &WidgetParams, names: Vec<String>) -> Option<Legend> {
    let show = params.show_legend.unwrap_or(true);
    if !show {
        return Some(Legend {
            show,
            ..Default::default()
        });
    }

    let mut legend = Legend {
        show,
        data: names,
        ..Default::default()
    };
    match params.legend_position.as_deref().unwrap_or("top") {
        "bottom" => legend.top = Some("bottom".to_string()),
        "left" => {
            legend.left = Some("left".to_string());
            legend.orient = Some("vertical".to_string());
        }
        "right" => {
            legend.left = Some("right".to_string());
            legend.orient = Some("vertical".to_string());
        }
        _ => legend.top = Some("top".to_string()),
    }
    Some(legend)
}

/// Value labels; a metric style's `showValues` overrides the widget's
pub fn label_options(context: &ChartDataContext, metric_index: usize) -> Option<Label> {
    let style = context.style(metric_index);
    let show = style
        .and_then(|s| s.show_values)
        .or(context.params.show_values)
        .unwrap_or(false);
    if !show {
        return None;
    }
    let position = style
        .and_then(|s| s.label_position.clone())
        .or_else(|| context.params.label_position.clone());
    Some(Label {
        show,
        position,
        formatter: None,
    })
}

/// Hover focus: `true` focuses the series, an object passes through
pub fn emphasis_options(params: &WidgetParams) -> Option<JsonValue> {
    match params.advanced("emphasis")? {
        JsonValue::Bool(true) => Some(json!({"focus": "series"})),
        JsonValue::Object(options) => {
            let mut options = options.clone();
            options
                .entry("focus")
                .or_insert_with(|| JsonValue::String("series".to_string()));
            Some(JsonValue::Object(options))
        }
        _ => None,
    }
}

/// Explicit style color for unsplit series, else the palette color
pub fn series_color(context: &ChartDataContext, metric_index: usize, series_index: usize, split: bool) -> String {
    let explicit = if split {
        None
    } else {
        context.style(metric_index).and_then(|s| s.color.clone())
    };
    explicit.unwrap_or_else(|| palette_color(context.params.palette.as_deref().unwrap_or_default(), series_index))
}

pub(crate) fn series_opacity(context: &ChartDataContext, metric_index: usize) -> Option<f64> {
    context
        .style(metric_index)
        .and_then(|s| s.opacity)
        .or(context.params.opacity)
}

/// Solid color, or a gradient derived from it when `advanced.gradient` is set
pub fn series_fill(params: &WidgetParams, color: &str) -> Fill {
    let options = match params.advanced("gradient") {
        Some(JsonValue::Bool(true)) => Map::new(),
        Some(JsonValue::Object(options)) => options.clone(),
        _ => return Fill::from(color),
    };
    let kind = match options.get("type").and_then(JsonValue::as_str) {
        Some("radial") => GradientKind::Radial,
        _ => GradientKind::Linear,
    };
    let start = options.get("startOpacity").and_then(JsonValue::as_f64).unwrap_or(1.0);
    let end = options
        .get("endOpacity")
        .and_then(JsonValue::as_f64)
        .unwrap_or(DEFAULT_GRADIENT_END_OPACITY);
    gradient_fill(color, kind, start, end)
}

/// Average/max/min reference lines plus explicit y values
pub fn mark_line_options(params: &WidgetParams) -> Option<MarkLine> {
    let options = params.advanced("markLine")?.as_object()?;
    let mut data = Vec::new();
    for (key, name) in [("average", "Average"), ("max", "Max"), ("min", "Min")] {
        if options.get(key).and_then(JsonValue::as_bool).unwrap_or(false) {
            data.push(MarkLineItem {
                kind: Some(key.to_string()),
                name: Some(name.to_string()),
                y_axis: None,
            });
        }
    }
    let values = options.get("values").and_then(JsonValue::as_array);
    for value in values.into_iter().flatten().filter_map(JsonValue::as_f64) {
        data.push(MarkLineItem {
            kind: None,
            name: None,
            y_axis: Some(value),
        });
    }
    (!data.is_empty()).then_some(MarkLine { data })
}

/// Shaded y ranges from `advanced.markArea.ranges`
pub fn mark_area_options(params: &WidgetParams) -> Option<MarkArea> {
    let block = params.advanced("markArea")?;
    let ranges = block
        .get("ranges")
        .and_then(JsonValue::as_array)
        .or_else(|| block.as_array())?;

    let data: Vec<[MarkAreaPoint; 2]> = ranges
        .iter()
        .filter_map(|range| {
            let from = range.get("from").and_then(JsonValue::as_f64)?;
            let to = range.get("to").and_then(JsonValue::as_f64)?;
            let name = range.get("label").and_then(JsonValue::as_str).map(str::to_string);
            Some([MarkAreaPoint { name, y_axis: from }, MarkAreaPoint { name: None, y_axis: to }])
        })
        .collect();
    (!data.is_empty()).then_some(MarkArea { data })
}

/// Route leftover advanced keys: typed names merge over the typed blocks,
/// everything else lands in `extra`. `overrides` is merged last of all.
pub(crate) fn apply_advanced(spec: &mut ChartSpecification, params: &WidgetParams) {
    let Some(ref advanced) = params.advanced else {
        return;
    };

    let mut overrides = JsonValue::Object(Map::new());
    for (key, value) in advanced {
        if CONSUMED_KEYS.contains(&key.as_str()) || value.is_null() {
            continue;
        }
        if TYPED_KEYS.contains(&key.as_str()) {
            let mut block = Map::new();
            block.insert(key.clone(), value.clone());
            deep_merge(&mut overrides, &JsonValue::Object(block));
        } else {
            spec.extra.insert(key.clone(), value.clone());
        }
    }
    if let Some(explicit) = params.advanced("overrides") {
        deep_merge(&mut overrides, explicit);
    }

    if overrides.as_object().is_some_and(|o| !o.is_empty()) {
        spec.overrides = Some(overrides);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_advanced(value: JsonValue) -> WidgetParams {
        WidgetParams {
            advanced: value.as_object().cloned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_helpers_are_noops_without_advanced() {
        let params = WidgetParams::default();
        assert!(emphasis_options(&params).is_none());
        assert!(mark_line_options(&params).is_none());
        assert!(mark_area_options(&params).is_none());
        assert_eq!(series_fill(&params, "#ff0000"), Fill::from("#ff0000"));
    }

    #[test]
    fn test_emphasis_options() {
        assert_eq!(
            emphasis_options(&with_advanced(json!({"emphasis": true}))),
            Some(json!({"focus": "series"}))
        );
        assert_eq!(
            emphasis_options(&with_advanced(json!({"emphasis": {"focus": "self", "scale": true}}))),
            Some(json!({"focus": "self", "scale": true}))
        );
        assert!(emphasis_options(&with_advanced(json!({"emphasis": false}))).is_none());
    }

    #[test]
    fn test_mark_line_options() {
        let params = with_advanced(json!({"markLine": {"average": true, "min": true, "values": [50, "x", 75.5]}}));
        let mark_line = mark_line_options(&params).unwrap();
        let kinds: Vec<Option<&str>> = mark_line.data.iter().map(|d| d.kind.as_deref()).collect();
        assert_eq!(kinds, vec![Some("average"), Some("min"), None, None]);
        assert_eq!(mark_line.data[3].y_axis, Some(75.5));

        assert!(mark_line_options(&with_advanced(json!({"markLine": {}}))).is_none());
    }

    #[test]
    fn test_mark_area_options() {
        let params = with_advanced(json!({"markArea": {"ranges": [{"from": 10, "to": 20, "label": "Target"}, {"from": 1}]}}));
        let mark_area = mark_area_options(&params).unwrap();
        assert_eq!(mark_area.data.len(), 1);
        assert_eq!(mark_area.data[0][0].name.as_deref(), Some("Target"));
        assert_eq!(mark_area.data[0][1].y_axis, 20.0);

        let params = with_advanced(json!({"markArea": [{"from": 0, "to": 5}]}));
        assert_eq!(mark_area_options(&params).map(|m| m.data.len()), Some(1));
    }

    #[test]
    fn test_series_fill_gradient() {
        let params = with_advanced(json!({"gradient": {"type": "radial", "endOpacity": 0.5}}));
        match series_fill(&params, "#00ff00") {
            Fill::Gradient(gradient) => {
                assert_eq!(gradient.kind, GradientKind::Radial);
                assert_eq!(gradient.color_stops[1].color, "rgba(0, 255, 0, 0.502)");
            }
            other => panic!("expected gradient, got {:?}", other),
        }
        assert!(matches!(series_fill(&with_advanced(json!({"gradient": true})), "#00ff00"), Fill::Gradient(_)));
    }

    #[test]
    fn test_legend_positions() {
        let params = WidgetParams {
            legend_position: Some("right".into()),
            ..Default::default()
        };
        let legend = legend_options(&params, vec!["A".into()]).unwrap();
        assert_eq!(legend.left.as_deref(), Some("right"));
        assert_eq!(legend.orient.as_deref(), Some("vertical"));

        let hidden = WidgetParams {
            show_legend: Some(false),
            ..Default::default()
        };
        let legend = legend_options(&hidden, vec!["A".into()]).unwrap();
        assert!(!legend.show);
        assert!(legend.data.is_empty());
    }

    #[test]
    fn test_apply_advanced_routes_keys() {
        let params = with_advanced(json!({
            "dataZoom": [{"type": "inside"}],
            "legend": {"itemGap": 4},
            "markLine": {"max": true},
            "overrides": {"legend": {"itemWidth": 10}, "animation": false}
        }));
        let mut spec = ChartSpecification::default();
        apply_advanced(&mut spec, &params);

        assert_eq!(spec.extra.get("dataZoom"), Some(&json!([{"type": "inside"}])));
        assert!(!spec.extra.contains_key("markLine"));
        assert_eq!(
            spec.overrides,
            Some(json!({"legend": {"itemGap": 4, "itemWidth": 10}, "animation": false}))
        );
    }
}
