//! Service configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, ServiceError};
use crate::{DEFAULT_CACHE_TTL_MS, DEFAULT_HIGHLIGHT_MS, DEFAULT_POLL_INTERVAL_SECS};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Where submission rows come from
    pub source: SourceConfig,

    /// Polling cadence and highlight window
    pub poll: PollConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Row source configuration. Exactly one of `url` and `file` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Endpoint returning `{headers, data}` JSON
    pub url: Option<String>,

    /// Local JSON payload with the same shape
    pub file: Option<PathBuf>,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,

    /// How long a fetched sheet is reused, in milliseconds (0 disables caching)
    pub cache_ttl_ms: u64,
}

/// Poller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between refreshes
    pub interval_secs: u64,

    /// How long changed teams stay highlighted, in milliseconds
    pub highlight_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            file: None,
            request_timeout_secs: 30,
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            highlight_ms: DEFAULT_HIGHLIGHT_MS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl SourceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

impl PollConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }
}

impl ServiceConfig {
    /// Load configuration from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Override settings from `LEADERBOARD_*` variables resolved through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // A source named here replaces whichever one the file configured.
        // Naming both is left for `validate` to reject.
        match (lookup("LEADERBOARD_URL"), lookup("LEADERBOARD_FILE")) {
            (Some(url), Some(file)) => {
                self.source.url = Some(url);
                self.source.file = Some(PathBuf::from(file));
            }
            (Some(url), None) => {
                self.source.url = Some(url);
                self.source.file = None;
            }
            (None, Some(file)) => {
                self.source.url = None;
                self.source.file = Some(PathBuf::from(file));
            }
            (None, None) => {}
        }

        if let Some(secs) = lookup("LEADERBOARD_POLL_SECS") {
            self.poll.interval_secs = parse_number("LEADERBOARD_POLL_SECS", &secs)?;
        }

        if let Some(ms) = lookup("LEADERBOARD_HIGHLIGHT_MS") {
            self.poll.highlight_ms = parse_number("LEADERBOARD_HIGHLIGHT_MS", &ms)?;
        }

        if let Some(ms) = lookup("LEADERBOARD_CACHE_TTL_MS") {
            self.source.cache_ttl_ms = parse_number("LEADERBOARD_CACHE_TTL_MS", &ms)?;
        }

        if let Some(level) = lookup("LEADERBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("LEADERBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Check the settings the poller cannot run without
    pub fn validate(&self) -> Result<()> {
        match (&self.source.url, &self.source.file) {
            (None, None) => return Err(ServiceError::NoSource),
            (Some(_), Some(_)) => {
                return Err(ServiceError::Config(
                    "both a sheet URL and a payload file are configured".to_string(),
                ))
            }
            _ => {}
        }

        if self.poll.interval_secs == 0 {
            return Err(ServiceError::Config(
                "poll interval must be at least one second".to_string(),
            ));
        }

        if self.source.request_timeout_secs == 0 {
            return Err(ServiceError::Config(
                "request timeout must be at least one second".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| {
            ServiceError::Config(format!(
                "{} must be a non-negative integer, got {:?}",
                key, value
            ))
        })
}
