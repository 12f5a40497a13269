use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::HintThresholds;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_levels_per_map")]
    pub levels_per_map: u32,
    #[serde(default = "default_show_parts_after")]
    pub show_parts_after: u32,
    #[serde(default = "default_show_result_after")]
    pub show_result_after: u32,
    #[serde(default = "default_show_answer_after")]
    pub show_answer_after: u32,
    #[serde(default = "default_max_answer_digits")]
    pub max_answer_digits: usize,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub catalog_path: Option<String>,
}

fn default_levels_per_map() -> u32 {
    10
}
fn default_show_parts_after() -> u32 {
    1
}
fn default_show_result_after() -> u32 {
    2
}
fn default_show_answer_after() -> u32 {
    3
}
fn default_max_answer_digits() -> usize {
    2
}
fn default_data_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mathmaps")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            levels_per_map: default_levels_per_map(),
            show_parts_after: default_show_parts_after(),
            show_result_after: default_show_result_after(),
            show_answer_after: default_show_answer_after(),
            max_answer_digits: default_max_answer_digits(),
            data_dir: default_data_dir(),
            catalog_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathmaps")
            .join("config.toml")
    }

    /// Clamp values into usable ranges. Thresholds are made non-decreasing
    /// so hint tiers escalate in order.
    pub fn validate(&mut self) {
        self.levels_per_map = self.levels_per_map.clamp(1, 50);
        self.max_answer_digits = self.max_answer_digits.clamp(1, 4);
        self.show_result_after = self.show_result_after.max(self.show_parts_after);
        self.show_answer_after = self.show_answer_after.max(self.show_result_after);
    }

    pub fn hint_thresholds(&self) -> HintThresholds {
        HintThresholds {
            show_parts: self.show_parts_after,
            show_result: self.show_result_after,
            show_answer: self.show_answer_after,
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.levels_per_map, 10);
        assert_eq!(config.hint_thresholds(), HintThresholds::default());
        assert_eq!(config.max_answer_digits, 2);
        assert!(config.data_dir.contains("mathmaps"));
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_config_partial_file_keeps_other_defaults() {
        let toml_str = r#"
levels_per_map = 12
show_answer_after = 5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.levels_per_map, 12);
        assert_eq!(config.show_answer_after, 5);
        assert_eq!(config.show_parts_after, 1);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.levels_per_map, deserialized.levels_per_map);
        assert_eq!(config.data_dir, deserialized.data_dir);
        assert_eq!(config.hint_thresholds(), deserialized.hint_thresholds());
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config {
            levels_per_map: 0,
            max_answer_digits: 9,
            ..Config::default()
        };
        config.validate();
        assert_eq!(config.levels_per_map, 1);
        assert_eq!(config.max_answer_digits, 4);
    }

    #[test]
    fn test_validate_orders_thresholds() {
        let mut config = Config {
            show_parts_after: 3,
            show_result_after: 1,
            show_answer_after: 2,
            ..Config::default()
        };
        config.validate();
        let t = config.hint_thresholds();
        assert_eq!((t.show_parts, t.show_result, t.show_answer), (3, 3, 3));
    }
}
