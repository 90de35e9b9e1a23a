//! HTTP listener settings for the webhook endpoints.
//!
//! The telephony platform abandons a webhook after a fixed deadline and
//! plays its own error message, so the request timeout is capped below it.

use serde::Deserialize;
use std::net::SocketAddr;

use super::error::ValidationError;

/// Seconds the telephony platform waits for a webhook reply.
pub const WEBHOOK_DEADLINE_SECS: u64 = 15;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Per-request timeout, at most [`WEBHOOK_DEADLINE_SECS`]
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Externally reachable origin, e.g. `https://intake.example.org`.
    /// When unset, voice documents use relative callback paths.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ValidationError::InvalidHost)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// URL the platform should post to for `path`.
    pub fn webhook_url(&self, path: &str) -> String {
        match self.public_base_url.as_deref().map(|b| b.trim_end_matches('/')) {
            Some(base) if !base.is_empty() => format!("{}{}", base, path),
            _ => path.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if !(1..=WEBHOOK_DEADLINE_SECS).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        if let Some(base) = &self.public_base_url {
            if !(base.starts_with("https://") || base.starts_with("http://")) {
                return Err(ValidationError::InvalidPublicBaseUrl);
            }
        }
        self.socket_addr().map(|_| ())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout(),
            public_base_url: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info,patient_intake=debug,tower_http=info".to_string()
}

fn default_request_timeout() -> u64 {
    10
}
