//! Intake conversation configuration

use serde::Deserialize;

use super::error::ValidationError;

/// A call idle for a day is gone.
pub const MAX_INACTIVITY_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Finished sessions hold patient data, so they are kept for a week at most.
pub const MAX_RETENTION_SECS: u64 = 7 * 24 * 60 * 60;

/// Tuning for the interview and the session sweeper
#[derive(Debug, Clone, Deserialize)]
pub struct IntakeConfig {
    /// Failed attempts allowed per step before falling back
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Idle seconds before an active session is abandoned
    #[serde(default = "default_inactivity_timeout")]
    pub inactivity_timeout_secs: u64,

    /// Seconds a finished session is kept before removal
    #[serde(default = "default_retention")]
    pub retention_secs: u64,

    /// Seconds between sweeper runs
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Appointment slots offered per call
    #[serde(default = "default_slot_count")]
    pub slot_count: usize,

    /// Transcripts below this confidence are treated as not understood
    #[serde(default)]
    pub min_confidence: f32,

    /// Clinic time zone as minutes east of UTC
    #[serde(default)]
    pub clinic_utc_offset_minutes: i32,
}

impl IntakeConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_retries > 10 {
            return Err(ValidationError::InvalidMaxRetries);
        }
        if !(1..=MAX_INACTIVITY_TIMEOUT_SECS).contains(&self.inactivity_timeout_secs) {
            return Err(ValidationError::InvalidInactivityTimeout);
        }
        if self.retention_secs > MAX_RETENTION_SECS {
            return Err(ValidationError::InvalidRetention);
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidSweepInterval);
        }
        if self.slot_count == 0 || self.slot_count > 5 {
            return Err(ValidationError::InvalidSlotCount);
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ValidationError::InvalidConfidence);
        }
        if self.clinic_utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ValidationError::InvalidUtcOffset);
        }
        Ok(())
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            inactivity_timeout_secs: default_inactivity_timeout(),
            retention_secs: default_retention(),
            sweep_interval_secs: default_sweep_interval(),
            slot_count: default_slot_count(),
            min_confidence: 0.0,
            clinic_utc_offset_minutes: 0,
        }
    }
}

fn default_max_retries() -> u32 {
    2
}

fn default_inactivity_timeout() -> u64 {
    600
}

fn default_retention() -> u64 {
    3600
}

fn default_sweep_interval() -> u64 {
    30
}

fn default_slot_count() -> usize {
    3
}
