//! Widget parameters and their override cascade
//!
//! Parameters arrive from several layers. Each layer is a partial
//! [`WidgetParams`]; layers fold left to right and a later `Some` wins.
//! The `advanced` block is merged deep instead, so a later layer only
//! replaces the advanced keys it actually names.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::config::ChartKind;

/// Presentation parameters for a chart widget
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetParams {
    pub title: Option<String>,
    pub show_legend: Option<bool>,
    pub legend_position: Option<String>,
    pub show_values: Option<bool>,
    pub label_position: Option<String>,
    pub stacked: Option<bool>,
    pub smooth: Option<bool>,
    pub horizontal: Option<bool>,
    pub area_fill: Option<bool>,
    pub opacity: Option<f64>,
    pub inner_radius: Option<f64>,
    pub axis_pointer: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub label_field: Option<String>,
    pub palette: Option<Vec<String>>,
    pub radar_shape: Option<String>,
    pub radar_split_number: Option<u32>,
    pub show_axis_names: Option<bool>,
    pub radar_scale_factor: Option<f64>,
    /// Renderer-specific per-feature options (`toolbox`, `emphasis`,
    /// `gradient`, `markLine`, `markArea`, `overrides`, ...)
    pub advanced: Option<Map<String, JsonValue>>,
}

macro_rules! overlay {
    ($base:ident, $layer:ident; $($field:ident),+ $(,)?) => {
        $(
            if $layer.$field.is_some() {
                $base.$field = $layer.$field.clone();
            }
        )+
    };
}

impl WidgetParams {
    /// Defaults every widget starts from
    pub fn component_defaults() -> Self {
        Self {
            show_legend: Some(true),
            legend_position: Some("top".to_string()),
            show_values: Some(false),
            stacked: Some(false),
            horizontal: Some(false),
            opacity: Some(1.0),
            ..Default::default()
        }
    }

    /// Defaults specific to one chart kind
    pub fn kind_defaults(kind: ChartKind) -> Self {
        match kind {
            ChartKind::Bar => Self {
                axis_pointer: Some("shadow".to_string()),
                label_position: Some("top".to_string()),
                ..Default::default()
            },
            ChartKind::Line => Self {
                axis_pointer: Some("line".to_string()),
                smooth: Some(false),
                label_position: Some("top".to_string()),
                ..Default::default()
            },
            ChartKind::Area => Self {
                axis_pointer: Some("line".to_string()),
                smooth: Some(false),
                area_fill: Some(true),
                opacity: Some(0.7),
                label_position: Some("top".to_string()),
                ..Default::default()
            },
            ChartKind::Pie => Self {
                legend_position: Some("right".to_string()),
                label_position: Some("outside".to_string()),
                ..Default::default()
            },
            ChartKind::Scatter | ChartKind::Bubble => Self {
                opacity: Some(0.8),
                ..Default::default()
            },
            ChartKind::Radar => Self {
                radar_shape: Some("polygon".to_string()),
                radar_split_number: Some(5),
                show_axis_names: Some(true),
                radar_scale_factor: Some(chart_data::dataset::DEFAULT_RADAR_SCALE_FACTOR),
                opacity: Some(0.3),
                ..Default::default()
            },
        }
    }

    /// Overlay `layer` on top of `self`
    pub fn merge(mut self, layer: &WidgetParams) -> Self {
        overlay!(self, layer;
            title,
            show_legend,
            legend_position,
            show_values,
            label_position,
            stacked,
            smooth,
            horizontal,
            area_fill,
            opacity,
            inner_radius,
            axis_pointer,
            x_label,
            y_label,
            label_field,
            palette,
            radar_shape,
            radar_split_number,
            show_axis_names,
            radar_scale_factor,
        );

        if let Some(ref advanced) = layer.advanced {
            let target = self.advanced.get_or_insert_with(Map::new);
            for (key, value) in advanced {
                match target.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        self
    }

    /// Look up one advanced block; `null` counts as absent
    pub fn advanced(&self, key: &str) -> Option<&JsonValue> {
        self.advanced
            .as_ref()
            .and_then(|a| a.get(key))
            .filter(|v| !v.is_null())
    }
}

/// Fold parameter layers left to right
pub fn merge_widget_params<'a, I>(layers: I) -> WidgetParams
where
    I: IntoIterator<Item = &'a WidgetParams>,
{
    layers
        .into_iter()
        .fold(WidgetParams::default(), |acc, layer| acc.merge(layer))
}

/// The full cascade: component defaults, kind defaults, configured params,
/// then call-site params
pub fn resolve_widget_params(
    kind: ChartKind,
    component_defaults: &WidgetParams,
    configured: &WidgetParams,
    call_site: Option<&WidgetParams>,
) -> WidgetParams {
    let kind_defaults = WidgetParams::kind_defaults(kind);
    let mut layers = vec![component_defaults, &kind_defaults, configured];
    layers.extend(call_site);
    merge_widget_params(layers)
}

/// Merge `source` into `target`: objects merge key by key, anything else replaces
pub fn deep_merge(target: &mut JsonValue, source: &JsonValue) {
    match (target, source) {
        (JsonValue::Object(target), JsonValue::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn advanced(value: JsonValue) -> Option<Map<String, JsonValue>> {
        match value {
            JsonValue::Object(map) => Some(map),
            _ => None,
        }
    }

    #[test]
    fn test_later_layers_win() {
        let base = WidgetParams {
            title: Some("Base".into()),
            stacked: Some(false),
            ..Default::default()
        };
        let top = WidgetParams {
            stacked: Some(true),
            ..Default::default()
        };
        let merged = merge_widget_params([&base, &top]);
        assert_eq!(merged.title.as_deref(), Some("Base"));
        assert_eq!(merged.stacked, Some(true));
    }

    #[test]
    fn test_advanced_block_merges_deep() {
        let config = WidgetParams {
            advanced: advanced(json!({
                "markLine": {"average": true},
                "toolbox": {"feature": {"saveAsImage": {}}}
            })),
            ..Default::default()
        };
        let call_site = WidgetParams {
            title: Some("Revenue".into()),
            advanced: advanced(json!({
                "markLine": {"max": true},
                "toolbox": {"feature": {"dataView": {}}}
            })),
            ..Default::default()
        };

        let merged = merge_widget_params([&config, &call_site]);
        assert_eq!(merged.advanced("markLine"), Some(&json!({"average": true, "max": true})));
        assert_eq!(
            merged.advanced("toolbox"),
            Some(&json!({"feature": {"saveAsImage": {}, "dataView": {}}}))
        );
    }

    #[test]
    fn test_resolve_cascade_order() {
        let component = WidgetParams {
            show_values: Some(true),
            opacity: Some(0.5),
            ..WidgetParams::component_defaults()
        };
        let configured = WidgetParams {
            axis_pointer: Some("cross".into()),
            ..Default::default()
        };
        let call_site = WidgetParams {
            show_values: Some(false),
            ..Default::default()
        };

        let params = resolve_widget_params(ChartKind::Area, &component, &configured, Some(&call_site));
        // kind defaults override component defaults
        assert_eq!(params.opacity, Some(0.7));
        assert_eq!(params.area_fill, Some(true));
        assert_eq!(params.axis_pointer.as_deref(), Some("cross"));
        assert_eq!(params.show_values, Some(false));
        assert_eq!(params.show_legend, Some(true));
    }

    #[test]
    fn test_deep_merge_replaces_scalars_and_arrays() {
        let mut target = json!({"a": {"b": 1, "c": [1, 2]}, "d": "x"});
        deep_merge(&mut target, &json!({"a": {"c": [3]}, "d": {"e": true}}));
        assert_eq!(target, json!({"a": {"b": 1, "c": [3]}, "d": {"e": true}}));
    }

    #[test]
    fn test_null_advanced_is_absent() {
        let params = WidgetParams {
            advanced: advanced(json!({"emphasis": null})),
            ..Default::default()
        };
        assert!(params.advanced("emphasis").is_none());
        assert!(params.advanced("missing").is_none());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let params: WidgetParams =
            serde_json::from_str(r#"{"showLegend": false, "innerRadius": 40, "advanced": {"gradient": {"type": "radial"}}}"#)
                .unwrap();
        assert_eq!(params.show_legend, Some(false));
        assert_eq!(params.inner_radius, Some(40.0));
        assert!(params.advanced("gradient").is_some());
    }

    fn arb_json() -> impl Strategy<Value = JsonValue> {
        let leaf = prop_oneof![
            Just(JsonValue::Null),
            any::<bool>().prop_map(JsonValue::from),
            (-100i64..100).prop_map(JsonValue::from),
            "[a-z]{0,4}".prop_map(JsonValue::from),
        ];
        leaf.prop_recursive(2, 12, 3, |inner| {
            prop::collection::btree_map("[a-c]", inner, 0..3)
                .prop_map(|map| JsonValue::Object(map.into_iter().collect()))
        })
    }

    fn arb_params() -> impl Strategy<Value = WidgetParams> {
        (
            prop::option::of("[A-Z][a-z]{0,6}"),
            prop::option::of(any::<bool>()),
            prop::option::of(0.0f64..1.0),
            prop::option::of(prop::collection::vec("#[0-9a-f]{6}", 0..3)),
            prop::option::of(prop::collection::btree_map("[a-d]", arb_json(), 0..3)),
        )
            .prop_map(|(title, stacked, opacity, palette, advanced)| WidgetParams {
                title,
                stacked,
                opacity,
                palette,
                advanced: advanced.map(|map| map.into_iter().collect()),
                ..Default::default()
            })
    }

    proptest! {
        #[test]
        fn test_call_site_fields_always_win(base in arb_params(), top in arb_params()) {
            let merged = merge_widget_params([&base, &top]);
            prop_assert_eq!(merged.title, top.title.or(base.title));
            prop_assert_eq!(merged.stacked, top.stacked.or(base.stacked));
            prop_assert_eq!(merged.opacity, top.opacity.or(base.opacity));
            prop_assert_eq!(merged.palette, top.palette.or(base.palette));
            if let Some(ref advanced) = top.advanced {
                for (key, value) in advanced {
                    if !value.is_object() {
                        prop_assert_eq!(merged.advanced.as_ref().and_then(|a| a.get(key)), Some(value));
                    }
                }
            }
        }

        #[test]
        fn test_merge_is_idempotent(params in arb_params()) {
            let once = merge_widget_params([&params]);
            prop_assert_eq!(&once, &params);
            prop_assert_eq!(merge_widget_params([&params, &params]), once);
        }

        #[test]
        fn test_deep_merge_with_self_is_identity(value in arb_json()) {
            let mut target = value.clone();
            deep_merge(&mut target, &value);
            prop_assert_eq!(target, value);
        }
    }
}
