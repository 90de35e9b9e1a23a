//! StartCallHandler - Opens the interview when a call connects.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::foundation::{CallId, Timestamp};
use crate::domain::intake::{
    IntakeError, IntakeSession, IntakeStateMachine, ResponseComposer, TurnResult, VoiceResponse,
};
use crate::ports::SessionStore;

use super::{log_outcome, snapshot_response, CallHandlerError};

/// Command to start (or restart) a call.
#[derive(Debug, Clone)]
pub struct StartCallCommand {
    pub call_id: CallId,
    pub caller_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StartCallResult {
    pub session: IntakeSession,
    pub response: VoiceResponse,
    /// False when the platform retried the start webhook.
    pub created: bool,
}

/// Handler for the call-start webhook.
pub struct StartCallHandler {
    store: Arc<dyn SessionStore>,
    machine: IntakeStateMachine,
    composer: ResponseComposer,
}

impl StartCallHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        machine: IntakeStateMachine,
        composer: ResponseComposer,
    ) -> Self {
        Self {
            store,
            machine,
            composer,
        }
    }

    pub async fn handle(&self, cmd: StartCallCommand) -> Result<StartCallResult, CallHandlerError> {
        let now = Timestamp::now();
        let lookup = self.store.get_or_create(&cmd.call_id, now).await?;

        let machine = &self.machine;
        let caller_number = cmd.caller_number.clone();
        let mut turn: Option<TurnResult> = None;
        let updated = self
            .store
            .update(&cmd.call_id, &mut |session: &mut IntakeSession| -> Result<(), IntakeError> {
                if session.caller_number.is_none() {
                    session.caller_number = caller_number.clone();
                }
                turn = Some(machine.begin(session, now)?);
                Ok(())
            })
            .await;

        match (updated, turn) {
            (Ok(session), Some(result)) => {
                if lookup.created {
                    info!(call_id = %session.call_id, "Call started");
                }
                log_outcome(&session, &result.outcome);
                Ok(StartCallResult {
                    response: self.composer.compose(&session, &result),
                    session,
                    created: lookup.created,
                })
            }
            (Err(e), _) => {
                warn!(
                    call_id = %cmd.call_id,
                    error = %e,
                    "Could not open session, repeating last known step"
                );
                Ok(self.from_snapshot(lookup.session, lookup.created))
            }
            (Ok(session), None) => Ok(self.from_snapshot(session, lookup.created)),
        }
    }

    fn from_snapshot(&self, session: IntakeSession, created: bool) -> StartCallResult {
        StartCallResult {
            response: snapshot_response(&self.machine, &self.composer, &session),
            session,
            created,
        }
    }
}
