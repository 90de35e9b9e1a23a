//! Telephony (TwiML) configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Settings for the rendered voice documents
#[derive(Debug, Clone, Deserialize)]
pub struct TelephonyConfig {
    /// Path the platform posts the next turn to
    #[serde(default = "default_continue_path")]
    pub continue_path: String,

    /// Seconds of silence before a gather ends
    #[serde(default = "default_gather_timeout")]
    pub gather_timeout_secs: u32,

    /// Text-to-speech voice name, platform default when unset
    #[serde(default)]
    pub voice: Option<String>,
}

impl TelephonyConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.continue_path.starts_with('/') {
            return Err(ValidationError::InvalidContinuePath);
        }
        if self.gather_timeout_secs == 0 || self.gather_timeout_secs > 60 {
            return Err(ValidationError::InvalidGatherTimeout);
        }
        Ok(())
    }
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            continue_path: default_continue_path(),
            gather_timeout_secs: default_gather_timeout(),
            voice: None,
        }
    }
}

fn default_continue_path() -> String {
    "/voice/continue".to_string()
}

fn default_gather_timeout() -> u32 {
    5
}
