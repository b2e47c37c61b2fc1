// src/error.rs

//! Unified error handling for the bridge monitor.
//!
//! Only the outer collaborators (HTTP, config, decoding) produce errors.
//! The status pipeline itself never fails: malformed fields degrade to
//! "inactive" or "not relevant".

use std::fmt;

use thiserror::Error;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Closure feed XML could not be read
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// URL construction failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// No subscription key was configured for the roads feed
    #[error("API key not configured. Set feed.api_key, feed.api_key_file or BRIDGE_MONITOR_API_KEY")]
    MissingApiKey,

    /// Upstream feed answered with a non-success status
    #[error("{message}")]
    Feed { status: u16, message: String },

    /// Upstream feed answered 200 with an empty body
    #[error("Received empty response from {source_name}")]
    EmptyResponse { source_name: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Map an HTTP status code from the roads feed to a user-facing error.
    ///
    /// The message never includes request headers, so the subscription key
    /// cannot leak through error output.
    pub fn feed(status: u16) -> Self {
        let message = match status {
            401 => "Authentication failed. Check API key configuration.".to_string(),
            429 => "Rate limit exceeded. Please try again later.".to_string(),
            500 | 502 | 503 => "Service temporarily unavailable. Please try again.".to_string(),
            other => format!("Unable to fetch data (Error {other})"),
        };
        Self::Feed { status, message }
    }

    /// Create an empty-response error for a named source.
    pub fn empty_response(source_name: impl fmt::Display) -> Self {
        Self::EmptyResponse {
            source_name: source_name.to_string(),
        }
    }
}
