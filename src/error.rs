//! Error types for the DataPulse refresh core

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when fetching one data source from the backend
///
/// These are always transient and local to a single source: the coordinator
/// records them and keeps the last good data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    /// Connection-level failure (DNS, refused, reset, TLS, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not settle before the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Backend answered with a non-success status
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    /// Backend answered 429
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Response body could not be decoded into the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    /// Creates an Http error from a status code and reason phrase
    pub fn http(status: u16, reason: impl Into<String>) -> Self {
        Self::Http {
            status,
            reason: reason.into(),
        }
    }

    /// Creates an InvalidResponse error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            Self::http(status.as_u16(), status.canonical_reason().unwrap_or_default())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Creates an Invalid error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Crate-level error for operations that span several layers
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A backend call failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The refresh controller task is no longer running
    #[error("Refresh controller has shut down")]
    Closed,
}
