//! Error types for the audit system

use thiserror::Error;

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Main error type for audit operations
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Request to {url} failed after {attempts} attempts. Last response code: {status}, body: {body}")]
    HttpError {
        url: String,
        attempts: u32,
        status: u16,
        body: String,
    },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Cannot determine dependency age for \"{coordinate}\" and repository \"{repository}\" (reason: {reason}). If errors should be skipped, set fail_on_error = false in the configuration.")]
    LookupError {
        coordinate: String,
        repository: String,
        reason: String,
    },

    #[error("Not found in registry: {0}")]
    NotFound(String),

    #[error("Unsupported repository: {0}")]
    Unsupported(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

impl AuditError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::NetworkError(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Configuration errors abort the run regardless of the failure policy.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigError(_))
    }

    /// Short reason tag used in user-facing failure messages.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "ConfigError",
            Self::HttpError { .. } => "HttpError",
            Self::NetworkError(_) => "NetworkError",
            Self::LookupError { .. } => "LookupError",
            Self::NotFound(_) => "NotFound",
            Self::Unsupported(_) => "Unsupported",
            Self::ParseError(_) => "ParseError",
            Self::IoError(_) => "IoError",
            Self::JsonError(_) => "JsonError",
            Self::TomlError(_) => "TomlError",
            Self::ReqwestError(_) => "RequestError",
        }
    }
}
