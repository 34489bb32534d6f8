use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::descriptor::{CellKind, RowAddress};
use crate::projector::SwitchLabels;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Descriptor file to load instead of the bundled sample.
    #[serde(default)]
    pub descriptor_path: Option<PathBuf>,
    #[serde(default = "default_section_titles")]
    pub section_titles: Vec<String>,
    #[serde(default)]
    pub wiring: Wiring,
    #[serde(default)]
    pub row_heights: RowHeights,
}

/// Rows that specific input callbacks write to. Defaults match the bundled sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wiring {
    #[serde(default = "default_date_row")]
    pub date_row: RowAddress,
    #[serde(default = "default_switch_row")]
    pub switch_row: RowAddress,
    #[serde(default = "default_switch_labels")]
    pub switch_labels: SwitchLabels,
    #[serde(default = "default_name_row")]
    pub name_row: RowAddress,
    #[serde(default = "default_first_name_row")]
    pub first_name_row: RowAddress,
    #[serde(default = "default_last_name_row")]
    pub last_name_row: RowAddress,
    #[serde(default = "default_slider_display_row")]
    pub slider_display_row: RowAddress,
    #[serde(default = "default_slider_value_row")]
    pub slider_value_row: RowAddress,
}

/// Row heights in points, keyed by cell kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RowHeights {
    #[serde(default = "default_normal_height")]
    pub normal: f32,
    #[serde(default = "default_date_picker_height")]
    pub date_picker: f32,
    #[serde(default = "default_height")]
    pub default: f32,
}

fn default_section_titles() -> Vec<String> {
    vec![
        "Personal".to_string(),
        "Preferences".to_string(),
        "Work Experience".to_string(),
    ]
}
fn default_date_row() -> RowAddress {
    RowAddress::new(0, 3)
}
fn default_switch_row() -> RowAddress {
    RowAddress::new(0, 6)
}
fn default_switch_labels() -> SwitchLabels {
    SwitchLabels {
        on: "Married".to_string(),
        off: "Single".to_string(),
    }
}
fn default_name_row() -> RowAddress {
    RowAddress::new(0, 0)
}
fn default_first_name_row() -> RowAddress {
    RowAddress::new(0, 1)
}
fn default_last_name_row() -> RowAddress {
    RowAddress::new(0, 2)
}
fn default_slider_display_row() -> RowAddress {
    RowAddress::new(2, 0)
}
fn default_slider_value_row() -> RowAddress {
    RowAddress::new(2, 1)
}
fn default_normal_height() -> f32 {
    60.0
}
fn default_date_picker_height() -> f32 {
    270.0
}
fn default_height() -> f32 {
    44.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            descriptor_path: None,
            section_titles: default_section_titles(),
            wiring: Wiring::default(),
            row_heights: RowHeights::default(),
        }
    }
}

impl Default for Wiring {
    fn default() -> Self {
        Self {
            date_row: default_date_row(),
            switch_row: default_switch_row(),
            switch_labels: default_switch_labels(),
            name_row: default_name_row(),
            first_name_row: default_first_name_row(),
            last_name_row: default_last_name_row(),
            slider_display_row: default_slider_display_row(),
            slider_value_row: default_slider_value_row(),
        }
    }
}

impl Default for RowHeights {
    fn default() -> Self {
        Self {
            normal: default_normal_height(),
            date_picker: default_date_picker_height(),
            default: default_height(),
        }
    }
}

impl RowHeights {
    pub fn for_kind(&self, kind: CellKind) -> f32 {
        match kind {
            CellKind::Normal => self.normal,
            CellKind::DatePicker => self.date_picker,
            _ => self.default,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Reads a config file, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("expandable")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.descriptor_path, None);
        assert_eq!(config.section_titles, default_section_titles());
        assert_eq!(config.wiring, Wiring::default());
        assert_eq!(config.row_heights, RowHeights::default());
    }

    #[test]
    fn test_config_partial_wiring_keeps_other_defaults() {
        let toml_str = r#"
descriptor_path = "/tmp/form.json"

[wiring]
switch_row = { section = 1, row = 2 }

[wiring.switch_labels]
on = "Yes"
off = "No"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.descriptor_path, Some(PathBuf::from("/tmp/form.json")));
        assert_eq!(config.wiring.switch_row, RowAddress::new(1, 2));
        assert_eq!(config.wiring.switch_labels.on, "Yes");
        assert_eq!(config.wiring.date_row, RowAddress::new(0, 3));
        assert_eq!(config.wiring.slider_value_row, RowAddress::new(2, 1));
    }

    #[test]
    fn test_row_height_lookup() {
        let heights = RowHeights::default();
        assert_eq!(heights.for_kind(CellKind::Normal), 60.0);
        assert_eq!(heights.for_kind(CellKind::DatePicker), 270.0);
        assert_eq!(heights.for_kind(CellKind::Switch), 44.0);
        assert_eq!(heights.for_kind(CellKind::Slider), 44.0);
    }

    #[test]
    fn test_load_from_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.wiring, Wiring::default());
    }

    #[test]
    fn test_save_then_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.section_titles = vec!["Only".to_string()];
        config.row_heights.normal = 50.0;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.section_titles, vec!["Only".to_string()]);
        assert_eq!(loaded.row_heights.normal, 50.0);
    }

    #[test]
    fn test_malformed_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "section_titles = 3").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
