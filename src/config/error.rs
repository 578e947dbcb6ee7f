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

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Acquire timeout must be positive")]
    InvalidTimeout,

    #[error("Coin cost for {0} applications cannot be negative")]
    NegativeCoinCost(&'static str),

    #[error("Page size must be positive")]
    InvalidPageSize,

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}
