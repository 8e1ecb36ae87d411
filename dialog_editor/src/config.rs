//! Editor configuration, loaded from TOML with every field defaulted.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Advisory thresholds used by the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    /// Response text longer than this (in characters) draws a warning.
    pub max_response_chars: usize,
    /// Node message longer than this (in characters) draws a warning.
    pub max_message_chars: usize,
    /// More responses than this on one node draws a warning.
    pub max_responses: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_response_chars: 200,
            max_message_chars: 1000,
            max_responses: 4,
        }
    }
}

/// Spacing of the layered auto-layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal distance between depth columns.
    pub column_width: f32,
    /// Vertical distance between nodes within a column.
    pub row_height: f32,
    pub origin_x: f32,
    pub origin_y: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_width: 280.0,
            row_height: 140.0,
            origin_x: 40.0,
            origin_y: 40.0,
        }
    }
}

/// Timing of debounced validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Quiet period after the last edit before validation runs.
    pub debounce_ms: u64,
}

impl SchedulerConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

/// Complete editor configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub validation: ValidationLimits,
    pub layout: LayoutConfig,
    pub scheduler: SchedulerConfig,
}

impl EditorConfig {
    /// Parse configuration from a TOML string. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        log::debug!("config: loaded editor configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EditorConfig::from_toml_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.validation.max_responses, 4);
        assert_eq!(config.scheduler.debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_partial_override() {
        let config = EditorConfig::from_toml_str(
            r#"
            [validation]
            max_responses = 6

            [layout]
            column_width = 400.0
            "#,
        )
        .unwrap();

        assert_eq!(config.validation.max_responses, 6);
        assert_eq!(config.validation.max_response_chars, 200);
        assert_eq!(config.layout.column_width, 400.0);
        assert_eq!(config.layout.row_height, 140.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = EditorConfig::from_toml_str("[scheduler]\ndebounce_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.toml");
        std::fs::write(&path, "[scheduler]\ndebounce_ms = 50\n").unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.scheduler.debounce_ms, 50);

        assert!(matches!(
            EditorConfig::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
