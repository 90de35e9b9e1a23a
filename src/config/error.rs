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

    #[error("Invalid host address")]
    InvalidHost,

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Request timeout must be between 1 and 15 seconds")]
    InvalidTimeout,

    #[error("Public base URL must start with http:// or https://")]
    InvalidPublicBaseUrl,

    #[error("Invalid Resend API key format")]
    InvalidResendKey,

    #[error("Invalid from email address")]
    InvalidFromEmail,

    #[error("Invalid recipient email address")]
    InvalidToEmail,

    #[error("Send attempts must be between 1 and 10")]
    InvalidSendAttempts,

    #[error("Retry limit must be at most 10")]
    InvalidMaxRetries,

    #[error("Inactivity timeout must be between 1 second and 1 day")]
    InvalidInactivityTimeout,

    #[error("Retention must be at most 7 days")]
    InvalidRetention,

    #[error("Sweep interval must be positive")]
    InvalidSweepInterval,

    #[error("Slot count must be between 1 and 5")]
    InvalidSlotCount,

    #[error("Minimum confidence must be between 0 and 1")]
    InvalidConfidence,

    #[error("Clinic UTC offset out of range")]
    InvalidUtcOffset,

    #[error("Continue path must start with '/'")]
    InvalidContinuePath,

    #[error("Gather timeout must be between 1 and 60 seconds")]
    InvalidGatherTimeout,
}
