//! Error types for the intake domain.

use crate::domain::foundation::{CallId, ValidationError};

use super::{IntakeStep, SessionStatus};

/// Faults raised while advancing a session.
///
/// These indicate inconsistent state, never bad caller input; bad input is
/// handled by the retry loop.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum IntakeError {
    #[error("Invalid transition: {0}")]
    InvalidTransition(#[from] ValidationError),

    #[error("Session {call_id} is {status} but at step {step}")]
    Inconsistent {
        call_id: CallId,
        step: IntakeStep,
        status: SessionStatus,
    },

    #[error("Session {0} has already finished")]
    SessionFinished(CallId),

    #[error("Session {0} cannot complete with fields still missing")]
    IncompleteRecord(CallId),
}
