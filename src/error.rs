//! Error types for the syncplicity_sample crate.

use thiserror::Error;

/// Errors raised while executing a single request against the API gateway.
///
/// These never escape the gateway: callers only observe an absent result,
/// while the error itself is logged for the operator.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Authorization rejected ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Failed to parse response JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid header value for {0}")]
    InvalidHeader(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Whether a fresh token could make the same request succeed.
    pub fn should_refresh_token(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// Errors that can occur while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Configuration is invalid, cannot continue:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),
}

/// Result type alias for ApiError.
pub type Result<T> = std::result::Result<T, ApiError>;
