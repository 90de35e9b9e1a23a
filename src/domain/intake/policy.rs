//! Retry policy shared by every collecting step.

use serde::{Deserialize, Serialize};

use super::IntakeStep;

/// Default number of re-prompts before a step falls back.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Stay on the step and ask again.
    Continue,
    /// Give up on the step and apply its fallback.
    Fallback,
}

/// How a step gives up once retries run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepFallback {
    /// Store the field as Unknown and move on.
    MarkUnknown,
    /// Keep the best address draft, flagged unvalidated.
    KeepUnvalidated,
    /// No sensible default exists; end the call.
    Abandon,
}

impl StepFallback {
    pub fn for_step(step: IntakeStep) -> Self {
        match step {
            IntakeStep::ValidateAddress => StepFallback::KeepUnvalidated,
            IntakeStep::OfferAppointments | IntakeStep::ConfirmAppointment => StepFallback::Abandon,
            _ => StepFallback::MarkUnknown,
        }
    }
}

/// Bounded retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Decides after `retry_count` failures at the current step.
    pub fn decide(&self, retry_count: u32) -> RetryDecision {
        if retry_count <= self.max_retries {
            RetryDecision::Continue
        } else {
            RetryDecision::Fallback
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}
