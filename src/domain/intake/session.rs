//! IntakeSession - Per-call conversation state.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CallId, StateMachine, Timestamp};

use super::{AbandonReason, IntakeError, IntakeStep, PartialInsurance, PatientRecord, SessionStatus};

/// State of one phone call's interview.
///
/// Step and status changes go through [`IntakeSession::enter_step`],
/// [`IntakeSession::complete`] and [`IntakeSession::abandon`], which validate
/// the transition and keep `step_history` and `retry_count` in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeSession {
    pub call_id: CallId,
    pub step: IntakeStep,
    pub retry_count: u32,
    pub record: PatientRecord,
    pub status: SessionStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub caller_number: Option<String>,
    pub step_history: Vec<IntakeStep>,
    pub pending_insurance: PartialInsurance,
    pub address_draft: Option<String>,
    pub slots_offered_at: Option<Timestamp>,
    pub abandon_reason: Option<AbandonReason>,
}

impl IntakeSession {
    /// Creates a session at `Greeting`.
    pub fn new(call_id: CallId, now: Timestamp) -> Self {
        Self {
            call_id,
            step: IntakeStep::Greeting,
            retry_count: 0,
            record: PatientRecord::default(),
            status: SessionStatus::Active,
            created_at: now,
            updated_at: now,
            caller_number: None,
            step_history: vec![IntakeStep::Greeting],
            pending_insurance: PartialInsurance::default(),
            address_draft: None,
            slots_offered_at: None,
            abandon_reason: None,
        }
    }

    /// Returns true once the session is completed or abandoned.
    pub fn is_finished(&self) -> bool {
        !self.status.is_active()
    }

    /// Checks that step and status agree.
    pub fn ensure_consistent(&self) -> Result<(), IntakeError> {
        let consistent = match self.status {
            SessionStatus::Active => !self.step.is_terminal(),
            SessionStatus::Completed => self.step == IntakeStep::Complete,
            SessionStatus::Abandoned => self.step == IntakeStep::Abandoned,
        };
        if consistent {
            Ok(())
        } else {
            Err(IntakeError::Inconsistent {
                call_id: self.call_id.clone(),
                step: self.step,
                status: self.status,
            })
        }
    }

    /// Moves to `target`, recording it and resetting the retry counter.
    pub fn enter_step(&mut self, target: IntakeStep, now: Timestamp) -> Result<(), IntakeError> {
        self.step = self.step.transition_to(target)?;
        self.step_history.push(target);
        self.retry_count = 0;
        self.updated_at = now;
        Ok(())
    }

    /// Advances to the next step in the sequence.
    pub fn advance(&mut self, now: Timestamp) -> Result<IntakeStep, IntakeError> {
        let next = self.step.next().ok_or_else(|| IntakeError::SessionFinished(self.call_id.clone()))?;
        self.enter_step(next, now)?;
        Ok(next)
    }

    /// Counts a failed attempt at the current step.
    pub fn record_failure(&mut self, now: Timestamp) -> u32 {
        self.retry_count += 1;
        self.updated_at = now;
        self.retry_count
    }

    /// Moves from `ConfirmAppointment` to `Complete`.
    pub fn complete(&mut self, now: Timestamp) -> Result<(), IntakeError> {
        let status = self.status.transition_to(SessionStatus::Completed)?;
        self.enter_step(IntakeStep::Complete, now)?;
        self.status = status;
        Ok(())
    }

    /// Ends the session early.
    pub fn abandon(&mut self, reason: AbandonReason, now: Timestamp) -> Result<(), IntakeError> {
        let status = self.status.transition_to(SessionStatus::Abandoned)?;
        self.enter_step(IntakeStep::Abandoned, now)?;
        self.status = status;
        self.abandon_reason = Some(reason);
        Ok(())
    }

    /// Records activity without changing state.
    pub fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
    }

    /// True if no turn has arrived within `timeout_secs` of `now`.
    pub fn is_stale(&self, timeout_secs: u64, now: &Timestamp) -> bool {
        self.status.is_active() && self.updated_at.has_elapsed(timeout_secs, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> IntakeSession {
        IntakeSession::new(CallId::new("CA100").unwrap(), Timestamp::now())
    }

    mod construction {
        use super::*;

        #[test]
        fn starts_at_greeting_and_active() {
            let s = session();
            assert_eq!(s.step, IntakeStep::Greeting);
            assert_eq!(s.status, SessionStatus::Active);
            assert_eq!(s.step_history, vec![IntakeStep::Greeting]);
            assert_eq!(s.retry_count, 0);
        }
    }

    mod stepping {
        use super::*;

        #[test]
        fn advance_resets_retries_and_records_history() {
            let mut s = session();
            s.advance(Timestamp::now()).unwrap();
            s.record_failure(Timestamp::now());
            assert_eq!(s.retry_count, 1);

            s.advance(Timestamp::now()).unwrap();
            assert_eq!(s.step, IntakeStep::CollectDOB);
            assert_eq!(s.retry_count, 0);
            assert_eq!(
                s.step_history,
                vec![IntakeStep::Greeting, IntakeStep::CollectName, IntakeStep::CollectDOB]
            );
        }

        #[test]
        fn enter_step_rejects_skips() {
            let mut s = session();
            let err = s.enter_step(IntakeStep::CollectContact, Timestamp::now());
            assert!(matches!(err, Err(IntakeError::InvalidTransition(_))));
            assert_eq!(s.step, IntakeStep::Greeting);
        }

        #[test]
        fn complete_requires_confirm_step() {
            let mut s = session();
            assert!(s.complete(Timestamp::now()).is_err());
        }
    }

    mod finishing {
        use super::*;

        #[test]
        fn abandon_sets_reason_and_terminal_step() {
            let mut s = session();
            s.abandon(AbandonReason::CallerHungUp, Timestamp::now()).unwrap();
            assert!(s.is_finished());
            assert_eq!(s.step, IntakeStep::Abandoned);
            assert_eq!(s.abandon_reason, Some(AbandonReason::CallerHungUp));
            assert!(s.ensure_consistent().is_ok());
        }

        #[test]
        fn abandon_twice_fails() {
            let mut s = session();
            s.abandon(AbandonReason::CallerHungUp, Timestamp::now()).unwrap();
            assert!(s.abandon(AbandonReason::InactivityTimeout, Timestamp::now()).is_err());
            assert_eq!(s.abandon_reason, Some(AbandonReason::CallerHungUp));
        }

        #[test]
        fn inconsistent_state_is_detected() {
            let mut s = session();
            s.step = IntakeStep::Complete;
            assert!(matches!(
                s.ensure_consistent(),
                Err(IntakeError::Inconsistent { .. })
            ));
        }
    }

    #[test]
    fn stale_after_timeout() {
        let start = Timestamp::from_unix_secs(1_000).unwrap();
        let s = IntakeSession::new(CallId::new("CA1").unwrap(), start);
        assert!(!s.is_stale(600, &Timestamp::from_unix_secs(1_600).unwrap()));
        assert!(s.is_stale(600, &Timestamp::from_unix_secs(1_601).unwrap()));
    }
}
