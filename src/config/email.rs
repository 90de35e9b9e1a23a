//! Email configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Email configuration (Resend)
///
/// Without an API key completed intakes are written to the log instead.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Resend API key
    #[serde(default)]
    pub resend_api_key: Option<String>,

    /// Resend API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// From email address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From name
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Scheduling team inbox
    #[serde(default = "default_to_email")]
    pub to_email: String,

    /// Attempts per notice before giving up
    #[serde(default = "default_max_send_attempts")]
    pub max_send_attempts: u32,

    /// Delay added per attempt
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,
}

impl EmailConfig {
    /// Get formatted "From" header value
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// API key, ignoring blank values
    pub fn api_key(&self) -> Option<&str> {
        self.resend_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Validate email configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(key) = self.api_key() {
            if !key.starts_with("re_") {
                return Err(ValidationError::InvalidResendKey);
            }
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        if !self.to_email.contains('@') {
            return Err(ValidationError::InvalidToEmail);
        }
        if self.max_send_attempts == 0 || self.max_send_attempts > 10 {
            return Err(ValidationError::InvalidSendAttempts);
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            base_url: default_base_url(),
            from_email: default_from_email(),
            from_name: default_from_name(),
            to_email: default_to_email(),
            max_send_attempts: default_max_send_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            send_timeout_secs: default_send_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_from_email() -> String {
    "intake@example.com".to_string()
}

fn default_from_name() -> String {
    "Patient Intake Line".to_string()
}

fn default_to_email() -> String {
    "scheduling@example.com".to_string()
}

fn default_max_send_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_send_timeout() -> u64 {
    10
}
