//! Collector configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Collector configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage settings.
    pub storage: StorageConfig,
    /// Refresh schedule.
    pub collector: CollectorConfig,
    /// External data source.
    pub source: SourceConfig,
}

impl Config {
    /// Load configuration from the default path, or defaults if it does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return every problem found.
    ///
    /// # Example
    ///
    /// ```
    /// use wevva_service::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.storage.validate());
        errors.extend(self.collector.validate());
        errors.extend(self.source.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load and validate configuration from a file.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Store file path.
    pub path: PathBuf,
    /// How long to wait for the store's file lock, in milliseconds.
    pub lock_timeout_ms: u64,
}

/// Maximum lock wait in milliseconds (one minute).
pub const MAX_LOCK_TIMEOUT_MS: u64 = 60_000;

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: wevva_store::default_db_path(),
            lock_timeout_ms: wevva_store::DEFAULT_LOCK_TIMEOUT.as_millis() as u64,
        }
    }
}

impl StorageConfig {
    /// Lock wait as a [`Duration`].
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Validate storage configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.path".to_string(),
                message: "database path cannot be empty".to_string(),
            });
        }

        if self.lock_timeout_ms == 0 {
            errors.push(ValidationError {
                field: "storage.lock_timeout_ms".to_string(),
                message: "lock timeout cannot be 0".to_string(),
            });
        } else if self.lock_timeout_ms > MAX_LOCK_TIMEOUT_MS {
            errors.push(ValidationError {
                field: "storage.lock_timeout_ms".to_string(),
                message: format!(
                    "lock timeout {} is too long (maximum {} ms)",
                    self.lock_timeout_ms, MAX_LOCK_TIMEOUT_MS
                ),
            });
        }

        errors
    }
}

/// Refresh schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Seconds between refresh cycles.
    pub interval_secs: u64,
}

/// Minimum refresh interval in seconds (1 minute).
pub const MIN_INTERVAL: u64 = 60;
/// Maximum refresh interval in seconds (1 day).
pub const MAX_INTERVAL: u64 = 86_400;

impl Default for CollectorConfig {
    fn default() -> Self {
        Self { interval_secs: 900 }
    }
}

impl CollectorConfig {
    /// Interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Validate the schedule.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.interval_secs < MIN_INTERVAL {
            errors.push(ValidationError {
                field: "collector.interval_secs".to_string(),
                message: format!(
                    "interval {} is too short (minimum {} seconds)",
                    self.interval_secs, MIN_INTERVAL
                ),
            });
        } else if self.interval_secs > MAX_INTERVAL {
            errors.push(ValidationError {
                field: "collector.interval_secs".to_string(),
                message: format!(
                    "interval {} is too long (maximum {} seconds / 1 day)",
                    self.interval_secs, MAX_INTERVAL
                ),
            });
        }

        errors
    }
}

/// External program that prints the daily report JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Program to run.
    pub program: PathBuf,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// Environment variable holding the API key, passed through untouched.
    pub api_key_env: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("wevva-fetch"),
            args: Vec::new(),
            api_key_env: "WEATHER_API_KEY".to_string(),
        }
    }
}

impl SourceConfig {
    /// Validate source configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.program.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "source.program".to_string(),
                message: "program cannot be empty".to_string(),
            });
        }

        if self.api_key_env.is_empty() {
            errors.push(ValidationError {
                field: "source.api_key_env".to_string(),
                message: "API key variable name cannot be empty".to_string(),
            });
        }

        errors
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `collector.interval_secs`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path: `wevva.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("wevva.toml")
}
