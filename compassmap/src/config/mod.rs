//! Configuration file handling.
//!
//! Settings live in an INI file under the user's configuration directory
//! (`~/.config/compassmap/config.ini` on Linux). Missing files and missing
//! keys fall back to defaults; present keys are validated on load.
//!
//! ```ini
//! [location]
//! high_accuracy = true
//! interval_ms = 100
//! distance_interval_m = 1.0
//!
//! [map]
//! default_latitude = 37.78825
//! default_longitude = -122.4324
//! latitude_delta = 0.0922
//! longitude_delta = 0.0421
//!
//! [logging]
//! level = info
//! directory =
//! ```

mod keys;

pub use keys::ConfigKey;

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::sensor::{DEFAULT_DISTANCE_INTERVAL_M, DEFAULT_WATCH_INTERVAL};
use crate::view::{
    DEFAULT_LATITUDE, DEFAULT_LATITUDE_DELTA, DEFAULT_LONGITUDE, DEFAULT_LONGITUDE_DELTA,
};

/// Directory name under the platform configuration directory.
const CONFIG_DIR_NAME: &str = "compassmap";

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors reading, writing or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read or parsed.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// The file could not be written.
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value failed to parse or is out of range.
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The key is not a known `section.key` name.
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Path of the user configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// `[location]` section: position subscription options.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSettings {
    pub high_accuracy: bool,
    pub interval_ms: u64,
    pub distance_interval_m: f64,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            interval_ms: DEFAULT_WATCH_INTERVAL.as_millis() as u64,
            distance_interval_m: DEFAULT_DISTANCE_INTERVAL_M,
        }
    }
}

impl LocationSettings {
    /// Minimum interval between fixes.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// `[map]` section: seed position and recenter span.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            default_latitude: DEFAULT_LATITUDE,
            default_longitude: DEFAULT_LONGITUDE,
            latitude_delta: DEFAULT_LATITUDE_DELTA,
            longitude_delta: DEFAULT_LONGITUDE_DELTA,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Default filter directive (overridden by `RUST_LOG`).
    pub level: String,
    /// Directory for rolling log files; `None` logs to stderr only.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

/// The full configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub location: LocationSettings,
    pub map: MapSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load the user configuration file, or defaults if it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from a specific path, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(raw) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, raw)?;
            }
        }
        Ok(config)
    }

    /// Save to the user configuration file.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini.write_to_file(path).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.location.interval_ms = 250;
        config.map.default_latitude = 51.5;
        config.logging.directory = Some(PathBuf::from("/var/log/compassmap"));
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[map]\nlatitude_delta = 0.5\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.map.latitude_delta, 0.5);
        assert_eq!(config.map.longitude_delta, DEFAULT_LONGITUDE_DELTA);
        assert_eq!(config.location, LocationSettings::default());
    }

    #[test]
    fn test_invalid_value_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[location]\ninterval_ms = soon\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("location.interval_ms"));
    }

    #[test]
    fn test_empty_directory_means_stderr_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[logging]\nlevel = debug\ndirectory =\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn test_location_interval() {
        let settings = LocationSettings::default();
        assert_eq!(settings.interval(), Duration::from_millis(100));
    }
}
