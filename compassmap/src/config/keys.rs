//! Typed configuration keys.
//!
//! Every setting in the file has a [`ConfigKey`]. Loading, saving and the
//! `config get`/`config set` CLI commands all go through the same key table,
//! so parsing and validation live in one place.

use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ConfigFile};

/// Filter levels accepted for `logging.level`.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// A `section.key` configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    LocationHighAccuracy,
    LocationIntervalMs,
    LocationDistanceIntervalM,
    MapDefaultLatitude,
    MapDefaultLongitude,
    MapLatitudeDelta,
    MapLongitudeDelta,
    LoggingLevel,
    LoggingDirectory,
}

impl ConfigKey {
    /// All keys, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::LocationHighAccuracy,
            ConfigKey::LocationIntervalMs,
            ConfigKey::LocationDistanceIntervalM,
            ConfigKey::MapDefaultLatitude,
            ConfigKey::MapDefaultLongitude,
            ConfigKey::MapLatitudeDelta,
            ConfigKey::MapLongitudeDelta,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingDirectory,
        ]
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::LocationHighAccuracy
            | ConfigKey::LocationIntervalMs
            | ConfigKey::LocationDistanceIntervalM => "location",
            ConfigKey::MapDefaultLatitude
            | ConfigKey::MapDefaultLongitude
            | ConfigKey::MapLatitudeDelta
            | ConfigKey::MapLongitudeDelta => "map",
            ConfigKey::LoggingLevel | ConfigKey::LoggingDirectory => "logging",
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::LocationHighAccuracy => "high_accuracy",
            ConfigKey::LocationIntervalMs => "interval_ms",
            ConfigKey::LocationDistanceIntervalM => "distance_interval_m",
            ConfigKey::MapDefaultLatitude => "default_latitude",
            ConfigKey::MapDefaultLongitude => "default_longitude",
            ConfigKey::MapLatitudeDelta => "latitude_delta",
            ConfigKey::MapLongitudeDelta => "longitude_delta",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// Accepted values, shown next to the setting in listings.
    pub fn value_hint(&self) -> &'static str {
        match self {
            ConfigKey::LocationHighAccuracy => "true | false",
            ConfigKey::LocationIntervalMs => "milliseconds between fixes, > 0",
            ConfigKey::LocationDistanceIntervalM => "meters moved between fixes, 0 = any",
            ConfigKey::MapDefaultLatitude => "degrees, -90 to 90",
            ConfigKey::MapDefaultLongitude => "degrees, -180 to 180",
            ConfigKey::MapLatitudeDelta | ConfigKey::MapLongitudeDelta => "span in degrees, > 0",
            ConfigKey::LoggingLevel => "trace | debug | info | warn | error | off",
            ConfigKey::LoggingDirectory => "path, empty = no log file",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text. Unset optional values are empty.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::LocationHighAccuracy => config.location.high_accuracy.to_string(),
            ConfigKey::LocationIntervalMs => config.location.interval_ms.to_string(),
            ConfigKey::LocationDistanceIntervalM => config.location.distance_interval_m.to_string(),
            ConfigKey::MapDefaultLatitude => config.map.default_latitude.to_string(),
            ConfigKey::MapDefaultLongitude => config.map.default_longitude.to_string(),
            ConfigKey::MapLatitudeDelta => config.map.latitude_delta.to_string(),
            ConfigKey::MapLongitudeDelta => config.map.longitude_delta.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse, validate and store a value.
    pub fn set(&self, config: &mut ConfigFile, raw: &str) -> Result<(), ConfigError> {
        let value = raw.trim();
        match self {
            ConfigKey::LocationHighAccuracy => {
                config.location.high_accuracy = self.parse_bool(value)?;
            }
            ConfigKey::LocationIntervalMs => {
                let ms: u64 = self.parse(value)?;
                if ms == 0 {
                    return Err(self.invalid(value, "must be greater than zero"));
                }
                config.location.interval_ms = ms;
            }
            ConfigKey::LocationDistanceIntervalM => {
                let meters: f64 = self.parse(value)?;
                if !meters.is_finite() || meters < 0.0 {
                    return Err(self.invalid(value, "must be a non-negative distance"));
                }
                config.location.distance_interval_m = meters;
            }
            ConfigKey::MapDefaultLatitude => {
                let lat: f64 = self.parse(value)?;
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(self.invalid(value, "must be between -90 and 90"));
                }
                config.map.default_latitude = lat;
            }
            ConfigKey::MapDefaultLongitude => {
                let lon: f64 = self.parse(value)?;
                if !(-180.0..=180.0).contains(&lon) {
                    return Err(self.invalid(value, "must be between -180 and 180"));
                }
                config.map.default_longitude = lon;
            }
            ConfigKey::MapLatitudeDelta => {
                config.map.latitude_delta = self.parse_span(value)?;
            }
            ConfigKey::MapLongitudeDelta => {
                config.map.longitude_delta = self.parse_span(value)?;
            }
            ConfigKey::LoggingLevel => {
                let level = value.to_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(self.invalid(value, "expected trace, debug, info, warn, error or off"));
                }
                config.logging.level = level;
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse<T: FromStr>(&self, value: &str) -> Result<T, ConfigError> {
        value.parse().map_err(|_| self.invalid(value, "not a number"))
    }

    fn parse_bool(&self, value: &str) -> Result<bool, ConfigError> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(self.invalid(value, "expected true or false")),
        }
    }

    fn parse_span(&self, value: &str) -> Result<f64, ConfigError> {
        let delta: f64 = self.parse(value)?;
        if !delta.is_finite() || delta <= 0.0 {
            return Err(self.invalid(value, "must be a positive span in degrees"));
        }
        Ok(delta)
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_keys_roundtrip_names() {
        for key in ConfigKey::all() {
            let parsed: ConfigKey = key.name().parse().unwrap();
            assert_eq!(parsed, *key);
        }
    }

    #[test]
    fn test_unknown_key() {
        let err = "map.zoom".parse::<ConfigKey>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn test_set_and_get() {
        let mut config = ConfigFile::default();
        ConfigKey::MapLatitudeDelta.set(&mut config, "0.25").unwrap();
        assert_eq!(ConfigKey::MapLatitudeDelta.get(&config), "0.25");

        ConfigKey::LocationHighAccuracy.set(&mut config, "no").unwrap();
        assert!(!config.location.high_accuracy);

        ConfigKey::LoggingLevel.set(&mut config, "DEBUG").unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_set_rejects_out_of_range() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::MapDefaultLatitude.set(&mut config, "91").is_err());
        assert!(ConfigKey::MapDefaultLongitude.set(&mut config, "-180.5").is_err());
        assert!(ConfigKey::MapLongitudeDelta.set(&mut config, "0").is_err());
        assert!(ConfigKey::LocationIntervalMs.set(&mut config, "0").is_err());
        assert!(ConfigKey::LocationDistanceIntervalM.set(&mut config, "-1").is_err());
        assert!(ConfigKey::LoggingLevel.set(&mut config, "loud").is_err());
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_directory_unset_is_empty() {
        let mut config = ConfigFile::default();
        assert_eq!(ConfigKey::LoggingDirectory.get(&config), "");

        ConfigKey::LoggingDirectory.set(&mut config, "/tmp/logs").unwrap();
        assert_eq!(config.logging.directory, Some(PathBuf::from("/tmp/logs")));

        ConfigKey::LoggingDirectory.set(&mut config, "").unwrap();
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn test_value_hints_match_validation() {
        let mut config = ConfigFile::default();
        for level in LOG_LEVELS {
            assert!(ConfigKey::LoggingLevel.value_hint().contains(level));
            ConfigKey::LoggingLevel.set(&mut config, level).unwrap();
        }
        assert!(ConfigKey::MapDefaultLatitude.value_hint().contains("-90 to 90"));
        assert!(ConfigKey::all().iter().all(|key| !key.value_hint().is_empty()));
    }

    #[test]
    fn test_sections_group_keys() {
        assert_eq!(ConfigKey::LocationIntervalMs.section(), "location");
        assert_eq!(ConfigKey::MapLongitudeDelta.section(), "map");
        assert_eq!(ConfigKey::LoggingDirectory.name(), "logging.directory");
    }
}
