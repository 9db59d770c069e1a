//! Logging configuration and initialization

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt as subscriber};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => f.write_str("text"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: Level,
    pub format: LogFormat,
    /// Problems found while reading the flags, reported once logging is up
    warnings: Vec<String>,
}

impl LoggingConfig {
    /// Build from the raw `--log-level` and `--log-format` values.
    ///
    /// Invalid values fall back to `info` and `text`.
    pub fn new(level: &str, format: &str) -> Self {
        let mut warnings = Vec::new();

        let level = level.parse::<Level>().unwrap_or_else(|_| {
            warnings.push(format!("Invalid log level '{level}', using 'info'"));
            Level::INFO
        });
        let format = format.parse::<LogFormat>().unwrap_or_else(|_| {
            warnings.push(format!("Invalid log format '{format}', using 'text'"));
            LogFormat::Text
        });

        Self {
            level,
            format,
            warnings,
        }
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Install the global tracing subscriber. `RUST_LOG` overrides the
    /// configured level when set.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str().to_ascii_lowercase()));

        match self.format {
            LogFormat::Json => {
                subscriber().json().with_env_filter(filter).init();
            }
            LogFormat::Text => {
                subscriber().with_env_filter(filter).init();
            }
        }

        for warning in &self.warnings {
            tracing::warn!("{warning}");
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Text,
            warnings: Vec::new(),
        }
    }
}
