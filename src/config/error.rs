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
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid chat backend URL format")]
    InvalidBackendUrl,

    #[error("Session TTL must be between 1 and 168 hours")]
    InvalidSessionTtl,

    #[error("Reply timeout must be between 1 and 600 seconds")]
    InvalidReplyTimeout,

    #[error("Poll interval must be between 100 and 10000 milliseconds")]
    InvalidPollInterval,

    #[error("Dispatch queue capacity must be between 1 and 1024")]
    InvalidQueueCapacity,
}
