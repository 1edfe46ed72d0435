//! Configuration management for myenovos
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files. Command-line flags are merged on top by the
//! binary before validation.

use crate::error::{EnovosError, Result};
use crate::window::CalendarZone;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

mod defaults;

pub use defaults::DEFAULT_USER_AGENT;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Customer portal endpoints and HTTP identity
    pub portal: PortalConfig,

    /// my.enovos.lu login
    pub credentials: CredentialsConfig,

    /// Which customer/contract/window to fetch
    pub selection: SelectionConfig,

    /// InfluxDB target for the `influx` command
    pub influx: InfluxConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Calendar timezone used for the default month-to-date window
    /// ("local" or an IANA name such as "Europe/Luxembourg")
    pub timezone: String,
}

/// Portal endpoints and HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Identity provider base URL (login and userinfo)
    pub auth_base_url: String,

    /// Customer portal service base URL (contracts and load profiles)
    pub portal_base_url: String,

    /// Browser User-Agent sent with every request
    pub user_agent: String,

    /// Optional request timeout; the transport default applies when unset
    pub timeout_seconds: Option<u64>,
}

/// Login credentials
#[derive(Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CredentialsConfig {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Target selection; unset values fall back to the default policy
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SelectionConfig {
    /// Customer number (defaults to the first customer of the user)
    pub customer_nr: Option<String>,

    /// Contract number (defaults to the first open electricity contract)
    pub contract_nr: Option<String>,

    /// Start as Unix timestamp (defaults to day 1 of the end's month)
    pub start_timestamp: Option<f64>,

    /// End as Unix timestamp (defaults to now)
    pub end_timestamp: Option<f64>,
}

/// InfluxDB 1.x connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluxConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional directory or file path for a daily-rolling log file
    pub file: Option<String>,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to the console (stderr)
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        let mut default_paths = vec![
            "myenovos.yaml".to_string(),
            "/etc/myenovos/config.yaml".to_string(),
        ];
        if let Some(home) = std::env::var_os("HOME") {
            default_paths.insert(
                1,
                Path::new(&home)
                    .join(".config/myenovos/config.yaml")
                    .to_string_lossy()
                    .to_string(),
            );
        }

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Calendar zone for window defaults
    pub fn calendar_zone(&self) -> Result<CalendarZone> {
        self.timezone.parse()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_base_url("portal.auth_base_url", &self.portal.auth_base_url)?;
        validate_base_url("portal.portal_base_url", &self.portal.portal_base_url)?;

        if self.portal.user_agent.trim().is_empty() {
            return Err(EnovosError::validation(
                "portal.user_agent",
                "User-Agent cannot be empty",
            ));
        }

        if self.portal.timeout_seconds == Some(0) {
            return Err(EnovosError::validation(
                "portal.timeout_seconds",
                "Must be greater than 0",
            ));
        }

        for (field, value) in [
            ("selection.start_timestamp", self.selection.start_timestamp),
            ("selection.end_timestamp", self.selection.end_timestamp),
        ] {
            if let Some(ts) = value
                && !ts.is_finite()
            {
                return Err(EnovosError::validation(field, "Must be a finite number"));
            }
        }

        if self.influx.host.trim().is_empty() {
            return Err(EnovosError::validation(
                "influx.host",
                "Host cannot be empty",
            ));
        }

        if self.influx.port == 0 {
            return Err(EnovosError::validation(
                "influx.port",
                "Port must be greater than 0",
            ));
        }

        crate::logging::parse_log_level(&self.logging.level)?;
        self.calendar_zone()?;

        Ok(())
    }
}

fn validate_base_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| EnovosError::validation(field, format!("Invalid URL '{}': {}", value, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(EnovosError::validation(
            field,
            format!("Expected an http(s) base URL, got '{}'", value),
        ));
    }
    Ok(())
}
