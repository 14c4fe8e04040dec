// src/error.rs

//! Unified error handling for the register crawler.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSV encoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Upstream answered with a non-success status
    #[error("Fetch of {url} failed with status {status}")]
    Fetch { url: String, status: u16 },

    /// A fetch kept failing until the attempt ceiling was reached
    #[error("{context}: gave up after {attempts} attempts: {message}")]
    RetriesExhausted {
        context: String,
        attempts: u32,
        message: String,
    },

    /// The list manifest a details stage depends on does not exist
    #[error("List manifest not found at {}; run the list stage first", path.display())]
    ManifestMissing { path: PathBuf },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an exhausted-retries error with context.
    pub fn exhausted(context: impl Into<String>, attempts: u32, last: &AppError) -> Self {
        Self::RetriesExhausted {
            context: context.into(),
            attempts,
            message: last.to_string(),
        }
    }
}
