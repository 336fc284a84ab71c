//! vmignore - list host vulnerabilities and ignore/restore detections
//!
//! This is the main entry point for the interactive client binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use vmignore_client::{Credentials, Session, SessionConfig};
use vmignore_common::{init_logging_with_config, Config, LogConfig, LogFormat};
use vmignore_console::{Prompter, Terminal};

/// Interactive vulnerability ignore/restore client
#[derive(Parser, Debug)]
#[command(name = "vmignore")]
#[command(version)]
#[command(about = "List host vulnerabilities and ignore or restore detections", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/vmignore/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API base URL (overrides config)
    #[arg(long)]
    api_url: Option<String>,

    /// Login name (overrides config)
    #[arg(short, long)]
    username: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json, compact)
    #[arg(long)]
    log_format: Option<String>,

    /// Include source file and line in log output
    #[arg(long)]
    log_file_lines: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;

    init_logging_with_config(log_config(&config)?);

    info!("vmignore {} starting", env!("CARGO_PKG_VERSION"));
    debug!("API base URL: {}", config.api.base_url);

    let mut terminal = Terminal::new();
    let credentials = read_credentials(&config, &mut terminal)?;

    let session_config = SessionConfig {
        base_url: config.api.base_url.clone(),
        timeout: config.api.timeout(),
        requested_with: config.api.requested_with.clone(),
    };
    let session = Session::open(session_config, &credentials)
        .map_err(vmignore_core::Error::from)
        .context("Could not log in")?;

    vmignore_console::run(session, &mut terminal)?;

    info!("Session closed");
    Ok(())
}

/// File, then environment, then command-line flags
fn load_config(args: &Args) -> Result<Config> {
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => match Config::default_path().filter(|p| p.exists()) {
            Some(path) => Config::from_file(&path)?,
            None => Config::default(),
        },
    };

    let mut config = config.merge_env()?;

    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(username) = &args.username {
        config.api.username = Some(username.clone());
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &args.log_format {
        config.logging.format = format.clone();
    }
    if args.log_file_lines {
        config.logging.file_lines = true;
    }

    config.validate()?;
    Ok(config)
}

fn log_config(config: &Config) -> Result<LogConfig> {
    let format = config
        .logging
        .format
        .parse::<LogFormat>()
        .map_err(anyhow::Error::msg)?;
    Ok(LogConfig::new()
        .level(&config.logging.level)
        .format(format)
        .with_file(config.logging.file_lines)
        .with_target(config.logging.target))
}

fn read_credentials<P: Prompter>(config: &Config, prompter: &mut P) -> Result<Credentials> {
    let username = match &config.api.username {
        Some(name) => name.clone(),
        None => prompter.ask("Username: ")?.trim().to_string(),
    };
    let password = match std::env::var("VMIGNORE_PASSWORD") {
        Ok(password) => password,
        Err(_) => prompter.ask_secret("Password: ")?,
    };
    Ok(Credentials::new(username, password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vmignore_console::Scripted;

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "vmignore",
            "--api-url",
            "https://qualysapi.qualys.eu/api/2.0/fo",
            "-u",
            "acme_ab",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.api_url.as_deref(), Some("https://qualysapi.qualys.eu/api/2.0/fo"));
        assert_eq!(args.username.as_deref(), Some("acme_ab"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.config.is_none());
    }

    #[test]
    fn test_log_config_follows_settings() {
        let mut config = Config::default();
        config.logging.format = String::from("json");
        config.logging.file_lines = true;
        config.logging.target = true;

        let log = log_config(&config).unwrap();
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.level, "warn");
        assert!(log.with_file);
        assert!(log.with_target);

        config.logging.format = String::from("xml");
        assert!(log_config(&config).is_err());
    }

    #[test]
    fn test_log_file_lines_flag() {
        let args = Args::parse_from(["vmignore", "--log-file-lines"]);
        assert!(args.log_file_lines);
    }

    #[test]
    fn test_configured_username_is_not_prompted() {
        if std::env::var("VMIGNORE_PASSWORD").is_ok() {
            return;
        }
        let config = Config::builder().username("acme_ab").build();
        let mut prompter = Scripted::new(["s3cret"]);
        let creds = read_credentials(&config, &mut prompter).unwrap();
        assert_eq!(creds.username, "acme_ab");
        assert_eq!(prompter.prompts(), vec!["Password: "]);
    }
}
