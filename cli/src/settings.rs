//! Render settings
//!
//! A small JSON file of house-style defaults. It becomes the component
//! defaults layer of the widget param cascade, so any chart configuration
//! or call-site params still win over it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use charts::{ColorScheme, WidgetParams};
use serde::{Deserialize, Serialize};

/// House-style defaults applied to every chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderSettings {
    /// Named color scheme (default, office, colorful, pastel, ocean)
    pub theme: Option<String>,
    /// Explicit palette; wins over the theme
    pub palette: Vec<String>,
    pub show_legend: Option<bool>,
    pub show_values: Option<bool>,
    pub title: Option<String>,
}

impl RenderSettings {
    /// The component-defaults layer these settings describe
    pub fn to_widget_params(&self) -> WidgetParams {
        let palette = if !self.palette.is_empty() {
            Some(self.palette.clone())
        } else {
            self.theme.as_deref().and_then(|theme| match ColorScheme::from_name(theme) {
                Some(scheme) => Some(scheme.palette()),
                None => {
                    tracing::warn!("Unknown theme '{}', using the default palette", theme);
                    None
                }
            })
        };

        WidgetParams {
            title: self.title.clone(),
            show_legend: self.show_legend,
            show_values: self.show_values,
            palette,
            ..Default::default()
        }
    }
}

/// Loads [`RenderSettings`] from a JSON file
pub struct SettingsLoader {
    settings_path: PathBuf,
    current: RenderSettings,
}

impl SettingsLoader {
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            current: RenderSettings::default(),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings, or defaults if the file doesn't exist or can't be parsed
    pub fn load_sync(&mut self) -> Result<&RenderSettings> {
        if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)
                .with_context(|| format!("reading settings {}", self.settings_path.display()))?;
            match serde_json::from_str::<RenderSettings>(&content) {
                Ok(settings) => {
                    self.current = settings;
                }
                Err(e) => {
                    tracing::warn!("Failed to parse settings file, using defaults: {}", e);
                    self.current = RenderSettings::default();
                }
            }
        } else {
            self.current = RenderSettings::default();
        }
        Ok(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = SettingsLoader::new(temp_dir.path().join("settings.json"));
        assert_eq!(loader.load_sync().unwrap(), &RenderSettings::default());
    }

    #[test]
    fn test_unparsable_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut loader = SettingsLoader::new(&path);
        assert_eq!(loader.load_sync().unwrap(), &RenderSettings::default());
    }

    #[test]
    fn test_load_settings_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, r#"{"theme": "Ocean", "showValues": true, "title": "Weekly"}"#).unwrap();

        let mut loader = SettingsLoader::new(&path);
        let settings = loader.load_sync().unwrap().clone();
        assert_eq!(settings.theme.as_deref(), Some("Ocean"));
        assert_eq!(settings.show_values, Some(true));

        let params = settings.to_widget_params();
        assert_eq!(params.title.as_deref(), Some("Weekly"));
        assert_eq!(params.palette, Some(ColorScheme::Ocean.palette()));
        assert_eq!(params.show_legend, None);
    }

    #[test]
    fn test_palette_wins_over_theme() {
        let settings = RenderSettings {
            theme: Some("office".into()),
            palette: vec!["#000000".into()],
            ..Default::default()
        };
        assert_eq!(settings.to_widget_params().palette, Some(vec!["#000000".to_string()]));

        let unknown = RenderSettings {
            theme: Some("neon".into()),
            ..Default::default()
        };
        assert_eq!(unknown.to_widget_params().palette, None);
    }
}
