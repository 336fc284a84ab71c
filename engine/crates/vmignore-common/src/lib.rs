//! vmignore Common - Shared utilities: logging and configuration
//!
//! This crate provides common functionality used by the vmignore binary and libraries.

pub mod config;
pub mod logging;

pub use config::{ApiConfig, Config, ConfigBuilder, LoggingConfig};
pub use logging::{init_logging_with_config, LogConfig, LogFormat};
