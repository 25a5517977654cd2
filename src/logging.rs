//! Structured logging setup.
//!
//! The library only emits `tracing` events; binaries call
//! [`init_logging_with_config`] once to install a subscriber. Output goes to
//! stderr so that commands printing documents keep stdout clean.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `OPROUTER_LOG_LEVEL` | `trace`, `debug`, `info`, `warn`, `error` | `info` |
//! | `OPROUTER_LOG_FORMAT` | `json` or `pretty` | `pretty` |
//! | `OPROUTER_LOG_TARGET_FILTER` | extra directives, e.g. `oprouter::router=debug` | none |
//! | `OPROUTER_LOG_INCLUDE_LOCATION` | include file and line | `false` |
//!
//! `RUST_LOG`, when set, replaces the level.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub log_level: String,
    pub format: LogFormat,
    /// Comma-separated `target=level` directives.
    pub target_filter: Option<String>,
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_level: lookup("OPROUTER_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("OPROUTER_LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.format),
            target_filter: lookup("OPROUTER_LOG_TARGET_FILTER").filter(|f| !f.trim().is_empty()),
            include_location: lookup("OPROUTER_LOG_INCLUDE_LOCATION")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.include_location),
        }
    }

    fn level(&self) -> Level {
        match self.log_level.trim().to_ascii_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Filter for this config; invalid directives are skipped.
    pub fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));
        let directives = self.target_filter.as_deref().unwrap_or("");
        for directive in directives.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(_) => eprintln!("Warning: invalid log filter directive: {directive}"),
            }
        }
        filter
    }
}

/// Install the global subscriber. A second call returns an error.
pub fn init_logging_with_config(config: &LogConfig) -> Result<()> {
    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("whatever"), LogFormat::Pretty);
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("OPROUTER_LOG_LEVEL", "debug"),
            ("OPROUTER_LOG_FORMAT", "json"),
            ("OPROUTER_LOG_TARGET_FILTER", "oprouter::router=trace"),
            ("OPROUTER_LOG_INCLUDE_LOCATION", "true"),
        ]
        .into_iter()
        .collect();
        let cfg = LogConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.level(), Level::DEBUG);
        assert_eq!(cfg.format, LogFormat::Json);
        assert_eq!(cfg.target_filter.as_deref(), Some("oprouter::router=trace"));
        assert!(cfg.include_location);
    }

    #[test]
    fn test_defaults_when_unset() {
        let cfg = LogConfig::from_lookup(|_| None);
        assert_eq!(cfg, LogConfig::default());
    }

    #[test]
    fn test_second_init_is_an_error() {
        let cfg = LogConfig::default();
        init_logging_with_config(&cfg).ok();
        assert!(init_logging_with_config(&cfg).is_err());
    }
}
