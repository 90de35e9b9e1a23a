//! Call handlers - one per telephony webhook.
//!
//! Handlers load the caller's session, run the state machine inside the
//! store's atomic update, and compose the reply. A turn that cannot be
//! applied falls back to the last committed snapshot and repeats its step.

mod call_status;
mod continue_call;
mod start_call;

pub use call_status::{CallStatusCommand, CallStatusHandler, CallStatusResult};
pub use continue_call::{ContinueCallCommand, ContinueCallHandler, ContinueCallResult};
pub use start_call::{StartCallCommand, StartCallHandler, StartCallResult};

use tracing::{debug, info, warn};

use crate::domain::intake::{
    IntakeSession, IntakeStateMachine, ResponseComposer, TurnOutcome, TurnResult, VoiceResponse,
};
use crate::ports::SessionStoreError;

/// Errors surfaced to the HTTP layer when no session state is available.
#[derive(Debug, thiserror::Error)]
pub enum CallHandlerError {
    #[error("session store unavailable: {0}")]
    Store(#[from] SessionStoreError),
}

/// Repeats the snapshot's current step without applying any turn.
fn snapshot_response(
    machine: &IntakeStateMachine,
    composer: &ResponseComposer,
    snapshot: &IntakeSession,
) -> VoiceResponse {
    let result = TurnResult {
        outcome: TurnOutcome::Resumed(snapshot.step),
        offered_slots: machine.offered_slots(snapshot),
    };
    composer.repeat_current(snapshot, &result)
}

fn log_outcome(session: &IntakeSession, outcome: &TurnOutcome) {
    match outcome {
        TurnOutcome::FellBack { from, to, fallback } => warn!(
            call_id = %session.call_id,
            step = %from,
            next = %to,
            fallback = ?fallback,
            fields = %session.record.completion_summary(),
            "Retries exhausted, applied fallback"
        ),
        TurnOutcome::Abandoned(reason) => warn!(
            call_id = %session.call_id,
            reason = %reason,
            fields = %session.record.completion_summary(),
            "Session abandoned"
        ),
        TurnOutcome::Completed => info!(
            call_id = %session.call_id,
            fields = %session.record.completion_summary(),
            "Intake completed"
        ),
        TurnOutcome::Reprompt { step, reason, counted } => debug!(
            call_id = %session.call_id,
            step = %step,
            retry_count = session.retry_count,
            reason = ?reason,
            counted,
            "Re-prompting"
        ),
        TurnOutcome::Advanced { from, to } => debug!(
            call_id = %session.call_id,
            step = %from,
            next = %to,
            "Step collected"
        ),
        TurnOutcome::Greeted | TurnOutcome::Resumed(_) | TurnOutcome::AlreadyFinished => debug!(
            call_id = %session.call_id,
            step = %session.step,
            outcome = ?outcome,
            "Turn handled"
        ),
    }
}
