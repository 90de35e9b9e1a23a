//! CallStatusHandler - Ends the interview when the platform reports hang-up.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::foundation::{CallId, Timestamp};
use crate::domain::intake::{AbandonReason, IntakeError, IntakeSession};
use crate::ports::SessionStore;

use super::CallHandlerError;

/// Platform statuses meaning the call is over.
const ENDED_STATUSES: [&str; 5] = ["completed", "busy", "failed", "no-answer", "canceled"];

#[derive(Debug, Clone)]
pub struct CallStatusCommand {
    pub call_id: CallId,
    pub call_status: String,
}

impl CallStatusCommand {
    pub fn call_ended(&self) -> bool {
        let status = self.call_status.trim().to_ascii_lowercase();
        ENDED_STATUSES.contains(&status.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallStatusResult {
    /// True when this callback abandoned an active session.
    pub abandoned: bool,
}

/// Handler for the call-status callback.
pub struct CallStatusHandler {
    store: Arc<dyn SessionStore>,
}

impl CallStatusHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: CallStatusCommand) -> Result<CallStatusResult, CallHandlerError> {
        let unchanged = CallStatusResult { abandoned: false };
        if !cmd.call_ended() {
            debug!(call_id = %cmd.call_id, status = %cmd.call_status, "Call status update");
            return Ok(unchanged);
        }

        match self.store.get(&cmd.call_id).await? {
            Some(session) if session.status.is_active() => {}
            _ => return Ok(unchanged),
        }

        let now = Timestamp::now();
        let mut abandoned = false;
        let session = self
            .store
            .update(&cmd.call_id, &mut |session: &mut IntakeSession| -> Result<(), IntakeError> {
                // Re-checked under the lock; the last turn may have just finished it.
                if session.status.is_active() {
                    session.abandon(AbandonReason::CallerHungUp, now)?;
                    abandoned = true;
                }
                Ok(())
            })
            .await?;

        if abandoned {
            info!(
                call_id = %session.call_id,
                step = %session.step_history.iter().rev().nth(1).copied().unwrap_or(session.step),
                status = %cmd.call_status,
                fields = %session.record.completion_summary(),
                "Caller hung up before finishing"
            );
        }
        Ok(CallStatusResult { abandoned })
    }
}
