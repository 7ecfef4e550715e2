//! Per-metric style overrides

use serde::{Deserialize, Serialize};

/// How a metric renders on a mixed axis chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    Bar,
    Line,
}

/// Display format of a table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnFormat {
    #[default]
    Text,
    Number,
    Date,
    Currency,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAlign {
    Left,
    Center,
    Right,
}

/// Style override for one metric, index-aligned with the metric list.
///
/// Every field is optional; unset fields fall back to widget params and
/// then to the palette.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricStyle {
    pub color: Option<String>,
    pub opacity: Option<f64>,
    pub series_type: Option<SeriesType>,
    pub show_values: Option<bool>,
    pub label_position: Option<String>,
    pub smooth: Option<bool>,
    pub area_fill: Option<bool>,
    pub symbol_size: Option<f64>,
    pub width: Option<u32>,
    pub align: Option<ColumnAlign>,
    pub format: Option<ColumnFormat>,
}

impl MetricStyle {
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_series_type(mut self, series_type: SeriesType) -> Self {
        self.series_type = Some(series_type);
        self
    }
}

/// Style at `index`, if one was configured
pub fn style_at(styles: &[MetricStyle], index: usize) -> Option<&MetricStyle> {
    styles.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_deserialize() {
        let style: MetricStyle =
            serde_json::from_str(r##"{"color": "#ff0000", "seriesType": "line", "showValues": true, "align": "right"}"##)
                .unwrap();
        assert_eq!(style.color.as_deref(), Some("#ff0000"));
        assert_eq!(style.series_type, Some(SeriesType::Line));
        assert_eq!(style.show_values, Some(true));
        assert_eq!(style.align, Some(ColumnAlign::Right));
        assert_eq!(style.opacity, None);
    }

    #[test]
    fn test_style_at() {
        let styles = vec![MetricStyle::default().with_color("red")];
        assert_eq!(style_at(&styles, 0).and_then(|s| s.color.as_deref()), Some("red"));
        assert!(style_at(&styles, 3).is_none());
    }
}
