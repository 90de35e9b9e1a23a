//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PATIENT_INTAKE` prefix and nested values use double underscores as separators.
//! Every section has defaults, so an empty environment yields a working
//! development setup that logs completed intakes instead of emailing them.
//!
//! # Example
//!
//! ```no_run
//! use patient_intake::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod email;
mod error;
mod intake;
mod server;
mod telephony;

pub use email::EmailConfig;
pub use error::{ConfigError, ValidationError};
pub use intake::IntakeConfig;
pub use server::{Environment, ServerConfig};
pub use telephony::TelephonyConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Email delivery of completed intakes (Resend)
    #[serde(default)]
    pub email: EmailConfig,

    /// Interview retry limits, timeouts and scheduling
    #[serde(default)]
    pub intake: IntakeConfig,

    /// Voice document rendering
    #[serde(default)]
    pub telephony: TelephonyConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `PATIENT_INTAKE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PATIENT_INTAKE__INTAKE__MAX_RETRIES=3` -> `intake.max_retries = 3`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PATIENT_INTAKE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.email.validate()?;
        self.intake.validate()?;
        self.telephony.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "PATIENT_INTAKE__SERVER__PORT",
        "PATIENT_INTAKE__SERVER__ENVIRONMENT",
        "PATIENT_INTAKE__INTAKE__MAX_RETRIES",
        "PATIENT_INTAKE__EMAIL__RESEND_API_KEY",
        "PATIENT_INTAKE__TELEPHONY__GATHER_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.intake.max_retries, 2);
        assert!(config.email.api_key().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PATIENT_INTAKE__SERVER__PORT", "3000");
        env::set_var("PATIENT_INTAKE__INTAKE__MAX_RETRIES", "4");
        env::set_var("PATIENT_INTAKE__EMAIL__RESEND_API_KEY", "re_test");
        env::set_var("PATIENT_INTAKE__TELEPHONY__GATHER_TIMEOUT_SECS", "8");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.intake.max_retries, 4);
        assert_eq!(config.email.api_key(), Some("re_test"));
        assert_eq!(config.telephony.gather_timeout_secs, 8);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PATIENT_INTAKE__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn test_validate_reports_first_failing_section() {
        let mut config = AppConfig::default();
        config.intake.slot_count = 9;
        assert_eq!(config.validate(), Err(ValidationError::InvalidSlotCount));
    }
}
