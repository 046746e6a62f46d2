//! Animation configuration file handling

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempo_core::{Time, DEFAULT_TIME_SCALE, MAX_TIME_SCALE};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read animation config: {0}")]
    Read(#[from] io::Error),

    #[error("failed to parse animation config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize animation config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// More decimal places than an exact time can hold
    #[error("time scale {0} exceeds the maximum of {max}", max = MAX_TIME_SCALE)]
    InvalidScale(u32),
}

/// Top-level animation configuration (e.g. `animation.toml`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AnimationConfig {
    #[serde(default)]
    pub time: TimeConfig,
    #[serde(default)]
    pub updater: UpdaterConfig,
}

/// Conversion of floating-point inputs to exact time
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimeConfig {
    /// Decimal places kept when converting a float to a time
    #[serde(default = "default_scale")]
    pub scale: u32,
}

fn default_scale() -> u32 {
    DEFAULT_TIME_SCALE
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
        }
    }
}

impl TimeConfig {
    /// Convert `n` to a time at the configured scale
    pub fn time(&self, n: f64) -> Time {
        Time::from_number_with_scale(n, self.scale)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UpdaterConfig {
    /// Current time of a freshly built updater; unset means no update has happened
    #[serde(default)]
    pub initial_time: Option<f64>,
}

impl AnimationConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AnimationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("loaded animation config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time.scale > MAX_TIME_SCALE {
            return Err(ConfigError::InvalidScale(self.time.scale));
        }
        Ok(())
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnimationConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnimationConfig::default());
        assert_eq!(config.time.scale, DEFAULT_TIME_SCALE);
        assert_eq!(config.updater.initial_time, None);
    }

    #[test]
    fn test_parse() {
        let config = AnimationConfig::from_toml_str(
            r#"
            [time]
            scale = 3

            [updater]
            initial_time = 1.5
            "#,
        )
        .unwrap();
        assert_eq!(config.time.scale, 3);
        assert_eq!(config.updater.initial_time, Some(1.5));
        assert_eq!(config.time.time(0.12345), Time::from_number_with_scale(0.123, 9));
    }

    #[test]
    fn test_invalid_scale() {
        let err = AnimationConfig::from_toml_str("[time]\nscale = 40\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidScale(40)));
    }

    #[test]
    fn test_parse_error() {
        let err = AnimationConfig::from_toml_str("[time]\nscale = \"fine\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AnimationConfig::default();
        config.updater.initial_time = Some(2.0);
        let text = config.to_toml().unwrap();
        assert_eq!(AnimationConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnimationConfig::load("/nonexistent/animation.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read(_)));
    }
}
