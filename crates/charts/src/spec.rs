//! Chart specification model
//!
//! The renderer-agnostic output: plain nested records of primitives.
//! Field names serialize in camelCase and unset options are omitted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::ChartResult;
use crate::params::deep_merge;
use crate::styles::Fill;

/// A complete chart specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpecification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<Tooltip>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolbox: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<Grid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radar: Option<RadarAxes>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub color: Vec<String>,
    #[serde(default)]
    pub series: Vec<Series>,
    /// Pass-through advanced blocks with no typed counterpart
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
    /// Raw object merged over the serialized specification by [`Self::to_json`]
    #[serde(skip)]
    pub overrides: Option<JsonValue>,
}

impl ChartSpecification {
    /// Serialize, then deep-merge any raw overrides last
    pub fn to_json(&self) -> ChartResult<JsonValue> {
        let mut json = serde_json::to_value(self)?;
        if let Some(ref overrides) = self.overrides {
            deep_merge(&mut json, overrides);
        }
        Ok(json)
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.data.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    pub show: bool,
    #[serde(default)]
    pub data: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipTrigger {
    Axis,
    Item,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisPointer {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub trigger: TooltipTrigger,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_pointer: Option<AxisPointer>,
    /// Template string such as `"{b}: {c}"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
}

impl Tooltip {
    pub fn item() -> Self {
        Self {
            trigger: TooltipTrigger::Item,
            axis_pointer: None,
            formatter: None,
        }
    }

    pub fn axis(pointer: impl Into<String>) -> Self {
        Self {
            trigger: TooltipTrigger::Axis,
            axis_pointer: Some(AxisPointer { kind: pointer.into() }),
            formatter: None,
        }
    }

    pub fn with_formatter(mut self, formatter: impl Into<String>) -> Self {
        self.formatter = Some(formatter.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    pub left: String,
    pub right: String,
    pub bottom: String,
    pub contain_label: bool,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            left: "3%".to_string(),
            right: "4%".to_string(),
            bottom: "3%".to_string(),
            contain_label: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisType {
    Category,
    Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    #[serde(rename = "type")]
    pub kind: AxisType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Axis {
    pub fn category(labels: Vec<String>) -> Self {
        Self {
            kind: AxisType::Category,
            name: None,
            data: Some(labels),
            min: None,
            max: None,
        }
    }

    pub fn value() -> Self {
        Self {
            kind: AxisType::Value,
            name: None,
            data: None,
            min: None,
            max: None,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name.filter(|n| !n.is_empty());
        self
    }

    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub name: String,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisName {
    pub show: bool,
}

/// Radar coordinate system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarAxes {
    pub indicator: Vec<Indicator>,
    pub shape: String,
    pub split_number: u32,
    pub axis_name: AxisName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    Bar,
    Line,
    Pie,
    Scatter,
    Radar,
}

/// One data entry of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataPoint {
    /// Category-aligned value
    Value(f64),
    /// `[x, y]` or `[x, y, r]` coordinates
    Coords(Vec<f64>),
    /// Named value (pie slice)
    Named { name: String, value: f64 },
    /// Bubble with a precomputed size
    Sized {
        value: Vec<f64>,
        #[serde(rename = "symbolSize")]
        symbol_size: f64,
    },
    /// One radar polygon
    Radar {
        name: String,
        value: Vec<f64>,
        #[serde(rename = "itemStyle", skip_serializing_if = "Option::is_none")]
        item_style: Option<ItemStyle>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Fill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Fill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub show: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkLineItem {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkLine {
    pub data: Vec<MarkLineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAreaPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub y_axis: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkArea {
    pub data: Vec<[MarkAreaPoint; 2]>,
}

/// One named, styled sequence of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SeriesType,
    pub data: Vec<DataPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smooth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_style: Option<AreaStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_style: Option<ItemStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_line: Option<MarkLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_area: Option<MarkArea>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<Vec<String>>,
}

impl Series {
    pub fn new(name: impl Into<String>, kind: SeriesType, data: Vec<DataPoint>) -> Self {
        Self {
            name: name.into(),
            kind,
            data,
            stack: None,
            smooth: None,
            area_style: None,
            item_style: None,
            label: None,
            emphasis: None,
            mark_line: None,
            mark_area: None,
            symbol_size: None,
            radius: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_camel_case_and_omits_none() {
        let spec = ChartSpecification {
            x_axis: Some(Axis::category(vec!["Jan".into()])),
            y_axis: Some(Axis::value()),
            series: vec![Series::new("Sales", SeriesType::Bar, vec![DataPoint::Value(1.0)])],
            ..Default::default()
        };
        let json = spec.to_json().unwrap();
        assert_eq!(json["xAxis"], json!({"type": "category", "data": ["Jan"]}));
        assert_eq!(json["yAxis"], json!({"type": "value"}));
        assert_eq!(json["series"][0], json!({"name": "Sales", "type": "bar", "data": [1.0]}));
        assert!(json.get("title").is_none());
        assert!(json.get("color").is_none());
    }

    #[test]
    fn test_data_point_shapes() {
        let points = vec![
            DataPoint::Named {
                name: "A".into(),
                value: 3.0,
            },
            DataPoint::Sized {
                value: vec![1.0, 2.0, 3.0],
                symbol_size: 20.0,
            },
            DataPoint::Coords(vec![1.0, 2.0]),
        ];
        let json = serde_json::to_value(&points).unwrap();
        assert_eq!(json, json!([{"name": "A", "value": 3.0}, {"value": [1.0, 2.0, 3.0], "symbolSize": 20.0}, [1.0, 2.0]]));
    }

    #[test]
    fn test_overrides_and_extra() {
        let mut spec = ChartSpecification {
            title: Some(Title {
                text: "Old".into(),
                ..Default::default()
            }),
            overrides: Some(json!({"title": {"left": "center"}, "animation": false})),
            ..Default::default()
        };
        spec.extra.insert("dataZoom".into(), json!([{"type": "inside"}]));

        let json = spec.to_json().unwrap();
        assert_eq!(json["title"], json!({"text": "Old", "left": "center"}));
        assert_eq!(json["animation"], json!(false));
        assert_eq!(json["dataZoom"][0]["type"], "inside");
    }

    #[test]
    fn test_tooltip_constructors() {
        let tooltip = Tooltip::axis("shadow");
        assert_eq!(
            serde_json::to_value(&tooltip).unwrap(),
            json!({"trigger": "axis", "axisPointer": {"type": "shadow"}})
        );
        let tooltip = Tooltip::item().with_formatter("{b}: {c} ({d}%)");
        assert_eq!(tooltip.formatter.as_deref(), Some("{b}: {c} ({d}%)"));
    }
}
