//! Error types for the leaderboard service

use thiserror::Error;

/// Result type for leaderboard service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors that can occur while fetching submissions or configuring the service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("Failed to decode sheet data: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No row source configured: set a sheet URL or a payload file")]
    NoSource,
}
