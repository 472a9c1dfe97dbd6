//! Error types for config loading and validation.

use thiserror::Error;

/// Errors returned while loading or validating the client config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    /// The JSON5 contents could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    /// The parsed value did not match the config schema.
    #[error("failed to decode config: {0}")]
    Decode(#[from] serde_json::Error),
    /// A specific field failed validation.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
}
