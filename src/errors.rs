//! Error types for the F1 dashboard
//!
//! This module defines the error types for every component of the application.
//! Data access errors never reach dashboard callers directly: they are logged and
//! replaced with fallback data. Query and configuration errors are the ones a
//! caller can actually observe.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Remote API and decoding errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success status
    #[error("Remote API error: HTTP {status}")]
    Status { status: u16 },

    /// Rate limit exceeded
    #[error("Rate limit exceeded. Server responded with HTTP 429")]
    RateLimitExceeded,

    /// Server overloaded
    #[error("Server overloaded. Server responded with HTTP 503")]
    ServerOverloaded,

    /// Maximum retries exceeded
    #[error("Maximum retry attempts ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    /// Remote call exceeded the fetch timeout
    #[error("Remote call timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Response body did not match the expected structure
    #[error("Malformed response payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A list the caller cannot do without came back empty
    #[error("Remote API returned no {what}")]
    EmptyPayload { what: &'static str },

    /// A string-typed numeric field did not parse
    #[error("Invalid numeric value for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// A race time did not parse
    #[error("Invalid race time: {value:?}")]
    InvalidTime { value: String },

    /// A calendar date did not parse
    #[error("Invalid date for {field}: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    /// Invalid URL built from the base URL and endpoint
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },
}

/// Query cache errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The loader reported a failure
    #[error("Query failed: {message}")]
    LoaderFailed { message: String },

    /// The loader did not finish within the load timeout
    #[error("Query timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The key is missing a required parameter
    #[error("Query {key} is disabled until its parameters are set")]
    Disabled { key: String },

    /// No cache entry exists for the key
    #[error("No cached query for {key}")]
    NotFound { key: String },
}

impl QueryError {
    /// Create a loader failure from any displayable error
    pub fn loader(error: impl std::fmt::Display) -> Self {
        Self::LoaderFailed {
            message: error.to_string(),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// User config directory could not be determined
    #[error("Could not determine user config directory")]
    NoConfigDir,
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Remote API error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Query cache error
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Api(ApiError::Http(_))
            | AppError::Api(ApiError::RateLimitExceeded)
            | AppError::Api(ApiError::ServerOverloaded)
            | AppError::Api(ApiError::Timeout { .. })
            | AppError::Api(ApiError::MaxRetriesExceeded { .. })
            | AppError::Query(QueryError::LoaderFailed { .. })
            | AppError::Query(QueryError::Timeout { .. }) => true,

            AppError::Api(ApiError::Decode(_))
            | AppError::Query(QueryError::Disabled { .. })
            | AppError::Config(_) => false,

            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Api(_) => "api",
            AppError::Query(_) => "query",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Remote API result type alias
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Query result type alias
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
