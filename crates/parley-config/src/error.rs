//! Error types for config loading and validation.

use thiserror::Error;

/// Errors raised while loading `parley.json5` layers or checking the merged result.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a config file failed.
    #[error("failed to read parley config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a config file failed.
    #[error("failed to parse parley.json5: {0}")]
    ParseFailed(#[from] json5::Error),
    /// Converting JSON values failed.
    #[error("failed to decode parley config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// A field in one layer has the wrong type or an unknown key.
    #[error("invalid value for `{path}`: {message}")]
    InvalidField { path: String, message: String },
    /// The merged question settings are unusable.
    #[error("invalid parley config: {0}")]
    Invalid(String),
}
