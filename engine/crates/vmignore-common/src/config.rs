//! Configuration management for vmignore
//!
//! Settings come from an optional TOML file, then `VMIGNORE_*` environment
//! variables, then command-line flags. They are read once at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use vmignore_core::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Upstream API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Create a configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Default config file location: `$HOME/.config/vmignore/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|home| home.join(".config").join("vmignore").join("config.toml"))
    }

    /// Merge with environment variables (VMIGNORE_ prefix)
    pub fn merge_env(self) -> Result<Self> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Merge with variables from an arbitrary lookup
    pub fn merge_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // API settings
        if let Some(val) = lookup("VMIGNORE_API_URL") {
            self.api.base_url = val;
        }
        if let Some(val) = lookup("VMIGNORE_USERNAME") {
            self.api.username = Some(val);
        }
        if let Some(val) = lookup("VMIGNORE_TIMEOUT_SECONDS") {
            self.api.timeout_seconds = val.parse().map_err(|_| Error::Configuration(
                format!("VMIGNORE_TIMEOUT_SECONDS must be a number, got '{}'", val),
            ))?;
        }

        // Logging
        if let Some(val) = lookup("VMIGNORE_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = lookup("VMIGNORE_LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Some(val) = lookup("VMIGNORE_LOG_FILE_LINES") {
            self.logging.file_lines = parse_flag("VMIGNORE_LOG_FILE_LINES", &val)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject values the session cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(Error::Configuration(String::from("api.base_url is empty")));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(Error::Configuration(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.timeout_seconds == 0 {
            return Err(Error::Configuration(String::from(
                "api.timeout_seconds must be positive",
            )));
        }
        Ok(())
    }
}

fn parse_flag(key: &str, val: &str) -> Result<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Configuration(format!(
            "{} must be a boolean, got '{}'",
            key, val
        ))),
    }
}

/// Upstream API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API (e.g. https://qualysapi.qg3.apps.qualys.com/api/2.0/fo)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Value of the X-Requested-With header sent on every request
    #[serde(default = "default_requested_with")]
    pub requested_with: String,

    /// Login name; prompted for when absent
    pub username: Option<String>,
}

impl ApiConfig {
    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_base_url() -> String {
    String::from("https://qualysapi.qg3.apps.qualys.com/api/2.0/fo")
}

fn default_timeout() -> u64 {
    15
}

fn default_requested_with() -> String {
    String::from("vmignore")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            requested_with: default_requested_with(),
            username: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Include source file and line in log events
    #[serde(default)]
    pub file_lines: bool,

    /// Include the module path in log events
    #[serde(default)]
    pub target: bool,
}

fn default_log_level() -> String {
    String::from("warn")
}

fn default_log_format() -> String {
    String::from("compact")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file_lines: false,
            target: false,
        }
    }
}

/// Builder for constructing Config
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api.base_url = url.into();
        self
    }

    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.api.timeout_seconds = seconds;
        self
    }

    pub fn requested_with(mut self, value: impl Into<String>) -> Self {
        self.config.api.requested_with = value.into();
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.api.username = Some(username.into());
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
