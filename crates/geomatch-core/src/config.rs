//! Layered configuration for the join
//!
//! Values are resolved with the precedence `CLI > environment > config file
//! > defaults`; the winning source is tracked per value.

use crate::error::{GeomatchError, Result};
use crate::models::MatchPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Default coordinate column names (the oplab export convention)
pub const DEFAULT_NORTHING_COLUMN: &str = "northing_utm [m]";
pub const DEFAULT_EASTING_COLUMN: &str = "easting_utm [m]";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for a matching run
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub northing_column: ConfigValue<String>,
    pub easting_column: ConfigValue<String>,
    pub distance: ConfigValue<Option<f64>>,
    pub mode: ConfigValue<MatchPolicy>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            northing_column: ConfigValue::new(
                DEFAULT_NORTHING_COLUMN.to_string(),
                ConfigSource::Default,
            ),
            easting_column: ConfigValue::new(
                DEFAULT_EASTING_COLUMN.to_string(),
                ConfigSource::Default,
            ),
            distance: ConfigValue::new(None, ConfigSource::Default),
            mode: ConfigValue::new(MatchPolicy::Closest, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeomatchError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeomatchError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        // Update values from file
        if let Some(northing_column) = file_config.northing_column {
            self.northing_column.update(northing_column, ConfigSource::File);
        }

        if let Some(easting_column) = file_config.easting_column {
            self.easting_column.update(easting_column, ConfigSource::File);
        }

        if let Some(distance) = file_config.distance {
            self.distance.update(Some(distance), ConfigSource::File);
        }

        if let Some(mode) = file_config.mode {
            self.mode.update(mode, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // GEOMATCH_NORTHING_COLUMN
        if let Ok(column) = env::var("GEOMATCH_NORTHING_COLUMN") {
            self.northing_column.update(column, ConfigSource::Environment);
        }

        // GEOMATCH_EASTING_COLUMN
        if let Ok(column) = env::var("GEOMATCH_EASTING_COLUMN") {
            self.easting_column.update(column, ConfigSource::Environment);
        }

        // GEOMATCH_DISTANCE
        if let Ok(raw) = env::var("GEOMATCH_DISTANCE") {
            match raw.parse::<f64>() {
                Ok(distance) => self.distance.update(Some(distance), ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOMATCH_DISTANCE value '{}': expected a number",
                    raw
                ),
            }
        }

        // GEOMATCH_MODE
        if let Ok(raw) = env::var("GEOMATCH_MODE") {
            match parse_policy(&raw) {
                Ok(mode) => self.mode.update(mode, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOMATCH_MODE value '{}': expected closest or all",
                    raw
                ),
            }
        }

        self
    }

    /// Apply CLI argument overrides (highest precedence)
    pub fn apply_cli_overrides(mut self, overrides: CliConfigOverrides) -> Self {
        if let Some(column) = overrides.northing_column {
            self.northing_column.update(column, ConfigSource::Cli);
        }

        if let Some(column) = overrides.easting_column {
            self.easting_column.update(column, ConfigSource::Cli);
        }

        if let Some(distance) = overrides.distance {
            self.distance.update(Some(distance), ConfigSource::Cli);
        }

        if let Some(mode) = overrides.mode {
            self.mode.update(mode, ConfigSource::Cli);
        }

        self
    }

    /// Validate the resolved values into the engine's runtime configuration
    pub fn into_match_config(self) -> Result<MatchConfig> {
        let threshold = self
            .distance
            .value
            .ok_or_else(|| GeomatchError::ConfigMissing { key: "distance".to_string() })?;

        MatchConfig::new(threshold, self.mode.value)
    }
}

/// Configuration overrides provided via CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfigOverrides {
    pub northing_column: Option<String>,
    pub easting_column: Option<String>,
    pub distance: Option<f64>,
    pub mode: Option<MatchPolicy>,
}

/// TOML file representation
#[derive(Debug, Deserialize)]
struct FileConfig {
    northing_column: Option<String>,
    easting_column: Option<String>,
    distance: Option<f64>,
    mode: Option<MatchPolicy>,
}

/// Parse a policy name as written in config files, env vars, and CLI args
pub fn parse_policy(raw: &str) -> Result<MatchPolicy> {
    match raw.trim().to_lowercase().as_str() {
        "closest" => Ok(MatchPolicy::Closest),
        "all" => Ok(MatchPolicy::All),
        other => Err(GeomatchError::ConfigInvalid {
            key: "mode".to_string(),
            reason: format!("unknown policy '{}': expected closest or all", other),
        }),
    }
}

/// Validated runtime configuration for the match engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConfig {
    /// Exclusive upper bound on the qualifying Euclidean distance
    pub threshold: f64,

    pub policy: MatchPolicy,
}

impl MatchConfig {
    pub fn new(threshold: f64, policy: MatchPolicy) -> Result<Self> {
        let config = Self { threshold, policy };
        config.validate()?;
        Ok(config)
    }

    /// Reject unusable thresholds before any matching work begins
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(GeomatchError::ConfigInvalid {
                key: "distance".to_string(),
                reason: format!("threshold must be a finite number > 0, got {}", self.threshold),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy() {
        assert_eq!(parse_policy("closest").unwrap(), MatchPolicy::Closest);
        assert_eq!(parse_policy("all").unwrap(), MatchPolicy::All);
        assert_eq!(parse_policy(" All ").unwrap(), MatchPolicy::All);
        assert!(parse_policy("random").is_err());
        assert!(parse_policy("").is_err());
    }

    #[test]
    fn test_match_config_rejects_bad_thresholds() {
        assert!(MatchConfig::new(0.0, MatchPolicy::Closest).is_err());
        assert!(MatchConfig::new(-1.0, MatchPolicy::Closest).is_err());
        assert!(MatchConfig::new(f64::NAN, MatchPolicy::Closest).is_err());
        assert!(MatchConfig::new(f64::INFINITY, MatchPolicy::Closest).is_err());
        assert!(MatchConfig::new(0.001, MatchPolicy::Closest).is_ok());
    }

    #[test]
    fn test_missing_distance_is_fatal() {
        let err = LayeredConfig::with_defaults().into_match_config().unwrap_err();

        assert!(matches!(err, GeomatchError::ConfigMissing { ref key } if key == "distance"));
    }

    #[test]
    fn test_cli_overrides_beat_defaults() {
        let config = LayeredConfig::with_defaults().apply_cli_overrides(CliConfigOverrides {
            northing_column: Some("north".to_string()),
            distance: Some(25.0),
            mode: Some(MatchPolicy::All),
            ..Default::default()
        });

        assert_eq!(config.northing_column.value, "north");
        assert_eq!(config.northing_column.source, ConfigSource::Cli);
        assert_eq!(config.easting_column.source, ConfigSource::Default);

        let match_config = config.into_match_config().unwrap();
        assert_eq!(match_config.threshold, 25.0);
        assert_eq!(match_config.policy, MatchPolicy::All);
    }

    #[test]
    fn test_lower_precedence_does_not_overwrite() {
        let mut value = ConfigValue::new(10.0, ConfigSource::Cli);
        value.update(20.0, ConfigSource::File);

        assert_eq!(value.value, 10.0);
        assert_eq!(value.source, ConfigSource::Cli);
    }
}
