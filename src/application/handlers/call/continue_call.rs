//! ContinueCallHandler - Applies one caller utterance to the interview.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::application::dispatch::ConfirmationDispatcher;
use crate::domain::foundation::{CallId, Timestamp};
use crate::domain::intake::{
    IntakeError, IntakeNotice, IntakeSession, IntakeStateMachine, ResponseComposer, Turn,
    TurnOutcome, TurnResult, VoiceResponse,
};
use crate::ports::SessionStore;

use super::{log_outcome, snapshot_response, CallHandlerError};

/// Command carrying one speech-recognition result.
#[derive(Debug, Clone)]
pub struct ContinueCallCommand {
    pub call_id: CallId,
    /// None when the gather timed out without speech.
    pub transcript: Option<String>,
    pub confidence: Option<f32>,
}

impl ContinueCallCommand {
    fn turn(&self) -> Turn {
        let turn = Turn::new(self.transcript.clone().unwrap_or_default());
        match self.confidence {
            Some(confidence) => turn.with_confidence(confidence),
            None => turn,
        }
    }
}

#[derive(Debug)]
pub struct ContinueCallResult {
    pub session: IntakeSession,
    pub response: VoiceResponse,
    /// None when the turn fell back to the stored snapshot.
    pub outcome: Option<TurnOutcome>,
    /// Background delivery started by this turn's completion.
    pub dispatch: Option<JoinHandle<bool>>,
}

/// Handler for the turn-continuation webhook.
pub struct ContinueCallHandler {
    store: Arc<dyn SessionStore>,
    machine: IntakeStateMachine,
    composer: ResponseComposer,
    dispatcher: ConfirmationDispatcher,
}

impl ContinueCallHandler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        machine: IntakeStateMachine,
        composer: ResponseComposer,
        dispatcher: ConfirmationDispatcher,
    ) -> Self {
        Self {
            store,
            machine,
            composer,
            dispatcher,
        }
    }

    pub async fn handle(
        &self,
        cmd: ContinueCallCommand,
    ) -> Result<ContinueCallResult, CallHandlerError> {
        let now = Timestamp::now();

        // A turn for a call we never saw (or already purged) restarts the
        // interview rather than guessing which question was answered.
        let recreated = self.store.get(&cmd.call_id).await?.is_none();
        if recreated {
            warn!(call_id = %cmd.call_id, "Turn for unknown call, recreating session");
            self.store.get_or_create(&cmd.call_id, now).await?;
        }

        let machine = &self.machine;
        let turn = cmd.turn();
        let mut applied: Option<TurnResult> = None;
        let updated = self
            .store
            .update(&cmd.call_id, &mut |session: &mut IntakeSession| -> Result<(), IntakeError> {
                let result = if recreated {
                    machine.begin(session, now)?
                } else {
                    machine.advance(session, &turn, now)?
                };
                applied = Some(result);
                Ok(())
            })
            .await;

        match (updated, applied) {
            (Ok(session), Some(result)) => {
                log_outcome(&session, &result.outcome);
                let dispatch = matches!(result.outcome, TurnOutcome::Completed)
                    .then(|| self.dispatcher.dispatch(IntakeNotice::from_session(&session)));
                Ok(ContinueCallResult {
                    response: self.composer.compose(&session, &result),
                    outcome: Some(result.outcome),
                    session,
                    dispatch,
                })
            }
            (Err(e), _) => {
                warn!(
                    call_id = %cmd.call_id,
                    error = %e,
                    "Turn could not be applied, repeating last known step"
                );
                let snapshot = self.store.get(&cmd.call_id).await?.ok_or(e)?;
                Ok(self.from_snapshot(snapshot))
            }
            (Ok(session), None) => Ok(self.from_snapshot(session)),
        }
    }

    fn from_snapshot(&self, session: IntakeSession) -> ContinueCallResult {
        ContinueCallResult {
            response: snapshot_response(&self.machine, &self.composer, &session),
            session,
            outcome: None,
            dispatch: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notification::MockNotificationSender;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::application::handlers::call::test_support::{call, machine, BrokenUpdates};
    use crate::domain::intake::{Directive, FieldState, IntakeStep, SessionStatus};
    use std::time::Duration;

    struct Fixture {
        store: InMemorySessionStore,
        sender: MockNotificationSender,
        handler: ContinueCallHandler,
    }

    fn fixture() -> Fixture {
        let store = InMemorySessionStore::new();
        let sender = MockNotificationSender::new();
        let dispatcher = ConfirmationDispatcher::new(Arc::new(sender.clone()))
            .with_backoff(Duration::from_millis(1));
        let handler = ContinueCallHandler::new(
            Arc::new(store.clone()),
            machine(),
            ResponseComposer::default(),
            dispatcher,
        );
        Fixture {
            store,
            sender,
            handler,
        }
    }

    fn said(id: &str, text: &str) -> ContinueCallCommand {
        ContinueCallCommand {
            call_id: call(id),
            transcript: Some(text.to_string()),
            confidence: Some(0.9),
        }
    }

    async fn started(fx: &Fixture, id: &str) {
        fx.handler.handle(said(id, "")).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_call_is_recreated_and_greeted() {
        let fx = fixture();

        let result = fx.handler.handle(said("CA1", "Jane Doe")).await.unwrap();

        assert_eq!(result.outcome, Some(TurnOutcome::Greeted));
        assert_eq!(result.session.step, IntakeStep::CollectName);
        assert!(result.session.record.name.is_none());
        assert!(fx.store.get(&call("CA1")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn name_turn_advances_to_date_of_birth() {
        let fx = fixture();
        started(&fx, "CA1").await;

        let result = fx.handler.handle(said("CA1", "My name is Jane Doe")).await.unwrap();

        assert_eq!(result.session.step, IntakeStep::CollectDOB);
        assert_eq!(result.session.record.display_name(), Some("Jane Doe"));
        assert_eq!(result.response.directive, Directive::ContinueListening);
        assert!(result.response.spoken_text().starts_with("Thank you, Jane."));
    }

    #[tokio::test]
    async fn silence_counts_as_a_failed_attempt() {
        let fx = fixture();
        started(&fx, "CA1").await;

        let result = fx
            .handler
            .handle(ContinueCallCommand {
                call_id: call("CA1"),
                transcript: None,
                confidence: None,
            })
            .await
            .unwrap();

        assert_eq!(result.session.retry_count, 1);
        assert_eq!(result.response.directive, Directive::RepeatWithHint);
    }

    #[tokio::test]
    async fn store_failure_repeats_snapshot_step() {
        let inner = InMemorySessionStore::new();
        inner.get_or_create(&call("CA1"), Timestamp::now()).await.unwrap();
        let handler = ContinueCallHandler::new(
            Arc::new(BrokenUpdates(inner)),
            machine(),
            ResponseComposer::default(),
            ConfirmationDispatcher::new(Arc::new(MockNotificationSender::new())),
        );

        let result = handler.handle(said("CA1", "Jane Doe")).await.unwrap();

        assert!(result.outcome.is_none());
        assert_eq!(result.session.step, IntakeStep::Greeting);
        assert_eq!(result.response.directive, Directive::RepeatWithHint);
    }

    #[tokio::test]
    async fn completion_dispatches_exactly_once() {
        let fx = fixture();
        started(&fx, "CA1").await;

        let script = [
            "My name is Jane Doe",
            "03/14/1985",
            "I have Cigna",
            "the ID is ABC 12345",
            "No, I don't",
            "knee pain after running",
            "123 Main St, Springfield, IL 62704",
            "555 123 4567",
            "the second one",
        ];
        for line in script {
            let result = fx.handler.handle(said("CA1", line)).await.unwrap();
            assert!(result.dispatch.is_none(), "dispatched early at {line:?}");
        }

        let done = fx.handler.handle(said("CA1", "yes please")).await.unwrap();
        assert_eq!(done.outcome, Some(TurnOutcome::Completed));
        assert_eq!(done.session.status, SessionStatus::Completed);
        assert!(done.response.ends_call());
        assert!(done.dispatch.unwrap().await.unwrap());

        let after = fx.handler.handle(said("CA1", "yes")).await.unwrap();
        assert_eq!(after.outcome, Some(TurnOutcome::AlreadyFinished));
        assert!(after.dispatch.is_none());

        let delivered = fx.sender.delivered();
        assert_eq!(delivered.len(), 1);
        assert!(delivered[0]
            .record
            .completion()
            .iter()
            .all(|(_, state)| *state == FieldState::Provided));
    }
}
