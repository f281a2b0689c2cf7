//! Configuration management for the Northwind server.
//!
//! Supports multiple configuration sources with precedence:
//! 1. Environment variables (highest priority)
//! 2. TOML configuration file
//! 3. Default values (lowest priority)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure for the Northwind server.
///
/// Can be loaded from TOML file or constructed with defaults.
/// Environment variables override TOML settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Relational store connection settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// CSV fallback data location
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Startup connectivity check
    #[serde(default)]
    pub health_check: HealthCheckConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration (host, port)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Relational store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL (default: "sqlite://data/northwind.db")
    #[serde(default = "default_db_url")]
    pub url: String,

    /// Max connections in pool (default: 10)
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Pool acquire timeout in seconds (default: 5)
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_seconds: u64,

    /// Apply embedded migrations when the store is reachable (default: true)
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

/// CSV data files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the CSV exports (default: "data")
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_customers_file")]
    pub customers_file: String,

    #[serde(default = "default_orders_file")]
    pub orders_file: String,
}

/// Where request tracking entries are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingBackend {
    /// Append to a CSV tracking file.
    Csv,
    /// Insert into the relational store (falls back to CSV when it is unavailable).
    Database,
}

/// Request tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Persistence strategy (default: csv)
    #[serde(default = "default_tracking_backend")]
    pub backend: TrackingBackend,

    /// Tracking file path for the csv backend (default: "data/webtracker.csv")
    #[serde(default = "default_tracking_file")]
    pub file: PathBuf,
}

/// Startup health check tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckConfig {
    /// Connection attempts before falling back to CSV (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts in milliseconds (default: 2000)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error (default: "info")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty (default: "pretty")
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_url() -> String {
    "sqlite://data/northwind.db".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_connection_timeout() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_customers_file() -> String {
    northwind_csv::CUSTOMERS_FILE.to_string()
}

fn default_orders_file() -> String {
    northwind_csv::ORDERS_FILE.to_string()
}

fn default_tracking_backend() -> TrackingBackend {
    TrackingBackend::Csv
}

fn default_tracking_file() -> PathBuf {
    Path::new("data").join(northwind_csv::TRACKING_FILE)
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
            max_connections: default_max_connections(),
            connection_timeout_seconds: default_connection_timeout(),
            run_migrations: true,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            customers_file: default_customers_file(),
            orders_file: default_orders_file(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            backend: default_tracking_backend(),
            file: default_tracking_file(),
        }
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_seconds)
    }
}

impl DataConfig {
    #[must_use]
    pub fn customers_path(&self) -> PathBuf {
        self.dir.join(&self.customers_file)
    }

    #[must_use]
    pub fn orders_path(&self) -> PathBuf {
        self.dir.join(&self.orders_file)
    }
}

impl HealthCheckConfig {
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl TrackingBackend {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Database => "database",
        }
    }
}

impl fmt::Display for TrackingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackingBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "database" | "db" | "sqlite" => Ok(Self::Database),
            other => Err(ConfigError::ValidationError(format!(
                "tracking.backend must be csv or database, got `{other}`"
            ))),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file doesn't exist or has invalid TOML syntax.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::TomlError { path, source: e })
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Loads from `path` (or `config.toml` when `None`) if it exists, otherwise
    /// uses defaults. Environment variables override TOML/default values.
    ///
    /// Supported environment variables:
    /// - `NORTHWIND_HOST` - Server host address
    /// - `NORTHWIND_PORT` - HTTP port
    /// - `NORTHWIND_DB_URL` - Relational store URL
    /// - `NORTHWIND_DATA_DIR` - CSV data directory
    /// - `NORTHWIND_TRACKING_BACKEND` - `csv` or `database`
    /// - `NORTHWIND_TRACKING_FILE` - Tracking file path
    /// - `NORTHWIND_LOG_LEVEL` - Log level
    /// - `NORTHWIND_LOG_FORMAT` - Log format
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new("config.toml"));
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("NORTHWIND_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("NORTHWIND_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(url) = std::env::var("NORTHWIND_DB_URL") {
            self.database.url = url;
        }

        if let Ok(dir) = std::env::var("NORTHWIND_DATA_DIR") {
            self.data.dir = PathBuf::from(dir);
        }

        if let Ok(backend) = std::env::var("NORTHWIND_TRACKING_BACKEND") {
            if let Ok(backend) = backend.parse() {
                self.tracking.backend = backend;
            }
        }

        if let Ok(file) = std::env::var("NORTHWIND_TRACKING_FILE") {
            self.tracking.file = PathBuf::from(file);
        }

        if let Ok(level) = std::env::var("NORTHWIND_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("NORTHWIND_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }

        if self.database.url.is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url cannot be empty".to_string(),
            ));
        }

        if !self.database.url.starts_with("sqlite:") {
            return Err(ConfigError::ValidationError(format!(
                "database.url must be a sqlite: URL, got `{}`",
                self.database.url
            )));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be > 0".to_string(),
            ));
        }

        if self.database.connection_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "database.connection_timeout_seconds must be > 0".to_string(),
            ));
        }

        if self.data.customers_file.is_empty() || self.data.orders_file.is_empty() {
            return Err(ConfigError::ValidationError(
                "data.customers_file and data.orders_file cannot be empty".to_string(),
            ));
        }

        if self.tracking.file.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "tracking.file cannot be empty".to_string(),
            ));
        }

        if self.health_check.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "health_check.max_attempts must be > 0".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be one of: {}",
                valid_formats.join(", ")
            )));
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading configuration file
    #[error("Failed to read config file {path:?}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("Failed to parse TOML in {path:?}: {source}")]
    TomlError {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
