//! Parser configuration.
//!
//! Every field has a default, so a partial JSON document is enough to tweak a
//! single knob.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::{
    DEFAULT_LINE_THRESHOLD, DEFAULT_MIN_WORD_LEN, DEFAULT_WORD_THRESHOLD,
};
use crate::schedule::{DEFAULT_FOOD_OFFSET_MINUTES, MAX_FOOD_OFFSET_MINUTES};

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables for [`crate::pipeline::PrescriptionParser`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Whole-line token-set score (0-100) a dictionary name must exceed.
    pub line_threshold: f64,
    /// Per-word Jaro-Winkler score (0-100) a dictionary name must exceed.
    pub word_threshold: f64,
    /// Shortest word considered by the per-word pass.
    pub min_word_len: usize,
    /// Names matched ahead of the built-in dictionary.
    pub medicine_names: Vec<String>,
    /// Markers appended to the built-in noise list.
    pub noise_markers: Vec<String>,
    /// Minutes a food instruction shifts reminder times.
    pub food_offset_minutes: i64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            line_threshold: DEFAULT_LINE_THRESHOLD,
            word_threshold: DEFAULT_WORD_THRESHOLD,
            min_word_len: DEFAULT_MIN_WORD_LEN,
            medicine_names: Vec::new(),
            noise_markers: Vec::new(),
            food_offset_minutes: DEFAULT_FOOD_OFFSET_MINUTES,
        }
    }
}

impl ParserConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Add a medicine name to the dictionary extension.
    pub fn add_medicine_name(&mut self, name: impl Into<String>) {
        self.medicine_names.push(name.into());
    }

    /// Add a noise marker.
    pub fn add_noise_marker(&mut self, marker: impl Into<String>) {
        self.noise_markers.push(marker.into());
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("line_threshold", self.line_threshold),
            ("word_threshold", self.word_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within 0-100, got {}",
                    field, value
                )));
            }
        }
        if self.min_word_len == 0 {
            return Err(ConfigError::Invalid("min_word_len must be at least 1".into()));
        }
        if !(0..=MAX_FOOD_OFFSET_MINUTES).contains(&self.food_offset_minutes) {
            return Err(ConfigError::Invalid(format!(
                "food_offset_minutes must be within 0-{}, got {}",
                MAX_FOOD_OFFSET_MINUTES, self.food_offset_minutes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.line_threshold, 85.0);
        assert_eq!(config.word_threshold, 90.0);
        assert_eq!(config.min_word_len, 4);
        assert_eq!(config.food_offset_minutes, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ParserConfig::from_json_str(r#"{"medicine_names": ["Zyrtec"], "word_threshold": 88}"#)
                .unwrap();
        assert_eq!(config.medicine_names, vec!["Zyrtec".to_string()]);
        assert_eq!(config.word_threshold, 88.0);
        assert_eq!(config.line_threshold, 85.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            ParserConfig::from_json_str(r#"{"line_threshold": 140}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ParserConfig::from_json_str(r#"{"min_word_len": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ParserConfig::from_json_str(r#"{"food_offset_minutes": -5}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ParserConfig::from_json_str(r#"{"food_offset_minutes": 100000000000000}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(ParserConfig::from_json_str(r#"{"food_offset_minutes": 720}"#).is_ok());
        assert!(matches!(
            ParserConfig::from_json_str("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"noise_markers": ["pharmacy"]}}"#).unwrap();
        let config = ParserConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.noise_markers, vec!["pharmacy".to_string()]);

        assert!(matches!(
            ParserConfig::from_json_file("/nonexistent/rx-scan.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
