//! Chart colors
//!
//! Fixed palettes, deterministic series colors and gradient fills.

use serde::{Deserialize, Serialize};

/// Default series palette
pub const DEFAULT_PALETTE: [&str; 9] = [
    "#5470c6", "#91cc75", "#fac858", "#ee6666", "#73c0de", "#3ba272", "#fc8452", "#9a60b4", "#ea7ccc",
];

/// Palette color for a series index, wrapping around the palette
pub fn color_for_index(index: usize) -> &'static str {
    DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()]
}

/// Color from a caller-supplied palette, falling back to the default one
pub fn palette_color(palette: &[String], index: usize) -> String {
    if palette.is_empty() {
        color_for_index(index).to_string()
    } else {
        palette[index % palette.len()].clone()
    }
}

/// RGBA color representation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color from RGB values (fully opaque)
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            3 => {
                let mut digits = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
                Some(Self::rgb(digits.next()??, digits.next()??, digits.next()??))
            }
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Convert to hex string with `#` prefix
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Convert to CSS color string
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.3})",
                self.r,
                self.g,
                self.b,
                self.a as f64 / 255.0
            )
        }
    }

    /// Same color with alpha set from an opacity in `[0, 1]`
    pub fn with_opacity(self, opacity: f64) -> Self {
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a: alpha, ..self }
    }
}

/// Named palettes selectable by theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Default,
    Office,
    Colorful,
    Pastel,
    Ocean,
}

impl ColorScheme {
    pub fn colors(&self) -> Vec<Color> {
        match self {
            ColorScheme::Default => DEFAULT_PALETTE.iter().filter_map(|c| Color::from_hex(c)).collect(),
            ColorScheme::Office => vec![
                Color::rgb(79, 129, 189),
                Color::rgb(192, 80, 77),
                Color::rgb(155, 187, 89),
                Color::rgb(128, 100, 162),
                Color::rgb(75, 172, 198),
                Color::rgb(247, 150, 70),
            ],
            ColorScheme::Colorful => vec![
                Color::rgb(255, 99, 132),
                Color::rgb(54, 162, 235),
                Color::rgb(255, 206, 86),
                Color::rgb(75, 192, 192),
                Color::rgb(153, 102, 255),
                Color::rgb(255, 159, 64),
            ],
            ColorScheme::Pastel => vec![
                Color::rgb(174, 198, 207),
                Color::rgb(255, 179, 186),
                Color::rgb(255, 223, 186),
                Color::rgb(186, 255, 201),
                Color::rgb(186, 225, 255),
                Color::rgb(219, 186, 255),
            ],
            ColorScheme::Ocean => vec![
                Color::rgb(0, 63, 92),
                Color::rgb(47, 75, 124),
                Color::rgb(0, 128, 128),
                Color::rgb(32, 178, 170),
                Color::rgb(102, 205, 170),
                Color::rgb(135, 206, 235),
            ],
        }
    }

    /// Palette as hex strings, ready for a specification's `color` list
    pub fn palette(&self) -> Vec<String> {
        self.colors().iter().map(Color::to_hex).collect()
    }

    /// Look up a scheme by name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        [Self::Default, Self::Office, Self::Colorful, Self::Pastel, Self::Ocean]
            .into_iter()
            .find(|scheme| scheme.name().eq_ignore_ascii_case(name))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorScheme::Default => "Default",
            ColorScheme::Office => "Office",
            ColorScheme::Colorful => "Colorful",
            ColorScheme::Pastel => "Pastel",
            ColorScheme::Ocean => "Ocean",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    #[default]
    Linear,
    Radial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f64,
    pub color: String,
}

/// Gradient fill in renderer coordinates (fractions of the shape's bounding box)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    #[serde(rename = "type")]
    pub kind: GradientKind,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<f64>,
    pub color_stops: Vec<ColorStop>,
}

/// A solid color or a gradient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fill {
    Solid(String),
    Gradient(Gradient),
}

impl From<&str> for Fill {
    fn from(color: &str) -> Self {
        Fill::Solid(color.to_string())
    }
}

impl From<String> for Fill {
    fn from(color: String) -> Self {
        Fill::Solid(color)
    }
}

/// Derive a two-stop gradient from a base color.
///
/// Linear gradients run top to bottom; radial gradients run center outwards.
/// Colors that cannot be parsed stay solid.
pub fn gradient_fill(color: &str, kind: GradientKind, start_opacity: f64, end_opacity: f64) -> Fill {
    let Some(base) = Color::from_hex(color) else {
        return Fill::Solid(color.to_string());
    };
    let color_stops = vec![
        ColorStop {
            offset: 0.0,
            color: base.with_opacity(start_opacity).to_css(),
        },
        ColorStop {
            offset: 1.0,
            color: base.with_opacity(end_opacity).to_css(),
        },
    ];
    let gradient = match kind {
        GradientKind::Linear => Gradient {
            kind,
            x: 0.0,
            y: 0.0,
            x2: Some(0.0),
            y2: Some(1.0),
            r: None,
            color_stops,
        },
        GradientKind::Radial => Gradient {
            kind,
            x: 0.5,
            y: 0.5,
            x2: None,
            y2: None,
            r: Some(0.5),
            color_stops,
        },
    };
    Fill::Gradient(gradient)
}
