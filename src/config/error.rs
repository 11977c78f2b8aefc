//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Database max_connections must be between 1 and 64")]
    InvalidPoolSize,

    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),

    #[error("Invalid AI base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Stream buffer must be between 1 and 1024")]
    InvalidStreamBuffer,
}
