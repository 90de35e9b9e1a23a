//! IntakeStateMachine - Validates a turn and advances the session.
//!
//! Each call to [`IntakeStateMachine::advance`] consumes one utterance for
//! the current step only. Success writes the field and moves forward; failure
//! feeds the retry policy, which either re-prompts or applies the step's
//! fallback. The machine never performs I/O, so the same session, turn and
//! instant always produce the same result.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::scheduling::{AppointmentGenerator, AppointmentSlot};
use crate::domain::validation::{AddressCheck, AddressComponent, AddressValidator};

use super::extract;
use super::{
    AbandonReason, Address, Collected, IntakeError, IntakeSession, IntakeStep, RetryDecision,
    RetryPolicy, StepFallback,
};

/// Default number of appointment slots offered.
pub const DEFAULT_SLOT_COUNT: usize = 3;

/// One transcribed caller utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub transcript: String,
    /// Speech recogniser confidence in `[0, 1]`, when reported.
    pub confidence: Option<f32>,
}

impl Turn {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// A turn with no speech, as sent after a listen timeout.
    pub fn silence() -> Self {
        Self::new("")
    }
}

/// Which half of the insurance answer is still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsurancePart {
    Payer,
    MemberId,
}

/// Why the caller is being asked again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepromptReason {
    NotUnderstood,
    LowConfidence,
    /// Progress was made; only this part is still needed.
    InsurancePartial(InsurancePart),
    AddressIncomplete(BTreeSet<AddressComponent>),
    SlotNotRecognised,
    /// The caller switched to another offered slot.
    SlotChanged,
    SlotDeclined,
    ConfirmationUnclear,
}

/// Result of one turn, for composing the reply.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Call opened; now asking for the name.
    Greeted,
    /// A field was collected and the session moved from `from` to `to`.
    Advanced { from: IntakeStep, to: IntakeStep },
    /// Still on `step`, asking again.
    Reprompt {
        step: IntakeStep,
        reason: RepromptReason,
        /// Counted against the retry budget.
        counted: bool,
    },
    /// Retries ran out and the step's default was applied.
    FellBack {
        from: IntakeStep,
        to: IntakeStep,
        fallback: StepFallback,
    },
    Completed,
    Abandoned(AbandonReason),
    /// Nothing happened; repeat the current step.
    Resumed(IntakeStep),
    /// The session had already ended before this turn.
    AlreadyFinished,
}

/// A turn's outcome together with the slots currently on offer.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResult {
    pub outcome: TurnOutcome,
    pub offered_slots: Vec<AppointmentSlot>,
}

/// Drives one session through the interview.
#[derive(Clone)]
pub struct IntakeStateMachine {
    validator: Arc<dyn AddressValidator>,
    generator: AppointmentGenerator,
    policy: RetryPolicy,
    slot_count: usize,
    min_confidence: f32,
}

impl IntakeStateMachine {
    pub fn new(
        validator: Arc<dyn AddressValidator>,
        generator: AppointmentGenerator,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            validator,
            generator,
            policy,
            slot_count: DEFAULT_SLOT_COUNT,
            min_confidence: 0.0,
        }
    }

    pub fn with_slot_count(mut self, slot_count: usize) -> Self {
        self.slot_count = slot_count;
        self
    }

    /// Transcripts below this confidence count as a failed attempt.
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Slots on offer for this session, regenerated from its anchor.
    pub fn offered_slots(&self, session: &IntakeSession) -> Vec<AppointmentSlot> {
        match (session.step, session.slots_offered_at) {
            (IntakeStep::OfferAppointments | IntakeStep::ConfirmAppointment, Some(anchor)) => {
                self.generator.generate(anchor, self.slot_count)
            }
            _ => Vec::new(),
        }
    }

    /// Opens the interview: Greeting moves straight to CollectName.
    ///
    /// A session already past the greeting is left alone and its current
    /// step is repeated.
    pub fn begin(&self, session: &mut IntakeSession, now: Timestamp) -> Result<TurnResult, IntakeError> {
        session.ensure_consistent()?;
        if session.is_finished() {
            return Ok(self.result(session, TurnOutcome::AlreadyFinished));
        }
        if session.step != IntakeStep::Greeting {
            return Ok(self.result(session, TurnOutcome::Resumed(session.step)));
        }
        session.enter_step(IntakeStep::CollectName, now)?;
        Ok(self.result(session, TurnOutcome::Greeted))
    }

    /// Processes one caller turn.
    pub fn advance(
        &self,
        session: &mut IntakeSession,
        turn: &Turn,
        now: Timestamp,
    ) -> Result<TurnResult, IntakeError> {
        session.ensure_consistent()?;
        if session.is_finished() {
            return Ok(self.result(session, TurnOutcome::AlreadyFinished));
        }
        if session.step == IntakeStep::Greeting {
            session.enter_step(IntakeStep::CollectName, now)?;
        }

        let outcome = if self.is_low_confidence(turn) {
            self.fail(session, RepromptReason::LowConfidence, now)?
        } else {
            self.handle_step(session, &turn.transcript, now)?
        };
        Ok(self.result(session, outcome))
    }

    fn result(&self, session: &IntakeSession, outcome: TurnOutcome) -> TurnResult {
        TurnResult {
            offered_slots: self.offered_slots(session),
            outcome,
        }
    }

    fn is_low_confidence(&self, turn: &Turn) -> bool {
        !turn.transcript.trim().is_empty()
            && turn
                .confidence
                .map(|c| c < self.min_confidence)
                .unwrap_or(false)
    }

    fn handle_step(
        &self,
        session: &mut IntakeSession,
        transcript: &str,
        now: Timestamp,
    ) -> Result<TurnOutcome, IntakeError> {
        let step = session.step;
        match step {
            IntakeStep::CollectName => match extract::extract_name(transcript) {
                Some(name) => {
                    session.record.name = Some(Collected::Provided(name));
                    self.move_on(session, step, now)
                }
                None => self.fail(session, RepromptReason::NotUnderstood, now),
            },
            IntakeStep::CollectDOB => {
                let today = now.local_at(self.generator.offset()).date();
                match extract::extract_date_of_birth(transcript, today) {
                    Some(dob) => {
                        session.record.date_of_birth = Some(Collected::Provided(dob));
                        self.move_on(session, step, now)
                    }
                    None => self.fail(session, RepromptReason::NotUnderstood, now),
                }
            }
            IntakeStep::CollectInsurance => self.handle_insurance(session, transcript, now),
            IntakeStep::CollectReferral => match extract::extract_referral(transcript) {
                Some(referral) => {
                    session.record.referral = Some(Collected::Provided(referral));
                    self.move_on(session, step, now)
                }
                None => self.fail(session, RepromptReason::NotUnderstood, now),
            },
            IntakeStep::CollectComplaint => match extract::extract_complaint(transcript) {
                Some(complaint) => {
                    session.record.chief_complaint = Some(Collected::Provided(complaint));
                    self.move_on(session, step, now)
                }
                None => self.fail(session, RepromptReason::NotUnderstood, now),
            },
            IntakeStep::CollectAddress => match extract::extract_address_text(transcript) {
                Some(text) => {
                    session.address_draft = Some(text);
                    self.move_on(session, step, now)
                }
                None => self.fail(session, RepromptReason::NotUnderstood, now),
            },
            IntakeStep::ValidateAddress => self.handle_address_correction(session, transcript, now),
            IntakeStep::CollectContact => {
                match extract::extract_contact(transcript, session.caller_number.as_deref()) {
                    Some(contact) => {
                        session.record.contact = Some(Collected::Provided(contact));
                        self.move_on(session, step, now)
                    }
                    None => self.fail(session, RepromptReason::NotUnderstood, now),
                }
            }
            IntakeStep::OfferAppointments => {
                let slots = self.offered_slots(session);
                match extract::extract_slot_choice(transcript, &slots) {
                    Some(index) => {
                        session.record.selected_appointment = slots.get(index).cloned();
                        self.move_on(session, step, now)
                    }
                    None => self.fail(session, RepromptReason::SlotNotRecognised, now),
                }
            }
            IntakeStep::ConfirmAppointment => self.handle_confirmation(session, transcript, now),
            IntakeStep::Greeting | IntakeStep::Complete | IntakeStep::Abandoned => {
                Err(IntakeError::Inconsistent {
                    call_id: session.call_id.clone(),
                    step: session.step,
                    status: session.status,
                })
            }
        }
    }

    fn handle_insurance(
        &self,
        session: &mut IntakeSession,
        transcript: &str,
        now: Timestamp,
    ) -> Result<TurnOutcome, IntakeError> {
        let learned = session
            .pending_insurance
            .merge(extract::extract_insurance(transcript));

        if let Some(insurance) = session.pending_insurance.complete() {
            session.record.insurance = Some(Collected::Provided(insurance));
            return self.move_on(session, IntakeStep::CollectInsurance, now);
        }

        let outstanding = if session.pending_insurance.payer.is_none() {
            InsurancePart::Payer
        } else {
            InsurancePart::MemberId
        };

        if learned {
            session.touch(now);
            return Ok(TurnOutcome::Reprompt {
                step: IntakeStep::CollectInsurance,
                reason: RepromptReason::InsurancePartial(outstanding),
                counted: false,
            });
        }

        let reason = if session.pending_insurance.is_empty() {
            RepromptReason::NotUnderstood
        } else {
            RepromptReason::InsurancePartial(outstanding)
        };
        self.fail(session, reason, now)
    }

    /// Picks the better of the bare utterance and the draft with the
    /// utterance appended.
    fn best_address_candidate(&self, draft: Option<&str>, utterance: &str) -> (String, AddressCheck) {
        let utterance = extract::normalize(utterance);
        let mut candidates = Vec::with_capacity(2);
        if !utterance.is_empty() {
            candidates.push(utterance.clone());
        }
        if let Some(draft) = draft.filter(|d| !d.is_empty()) {
            if utterance.is_empty() {
                candidates.push(draft.to_string());
            } else {
                candidates.push(format!("{} {}", draft, utterance));
            }
        }

        let mut best: Option<(String, AddressCheck)> = None;
        for candidate in candidates {
            let check = self.validator.check(&candidate);
            if check.valid {
                return (candidate, check);
            }
            // Ties go to the later, merged candidate.
            let better = best
                .as_ref()
                .map(|(_, current)| check.missing.len() <= current.missing.len())
                .unwrap_or(true);
            if better {
                best = Some((candidate, check));
            }
        }

        best.unwrap_or_else(|| (String::new(), self.validator.check("")))
    }

    /// Runs validation on entering ValidateAddress, with no new utterance.
    fn validate_on_entry(
        &self,
        session: &mut IntakeSession,
        from: IntakeStep,
        now: Timestamp,
    ) -> Result<TurnOutcome, IntakeError> {
        if matches!(session.record.address, Some(Collected::Unknown)) {
            let to = session.advance(now)?;
            return Ok(TurnOutcome::FellBack {
                from,
                to,
                fallback: StepFallback::MarkUnknown,
            });
        }

        let draft = session.address_draft.clone().unwrap_or_default();
        let check = self.validator.check(&draft);
        match check.corrected {
            Some(corrected) if check.valid => {
                session.record.address = Some(Collected::Provided(Address::verified(corrected, draft)));
                let to = session.advance(now)?;
                Ok(TurnOutcome::Advanced { from, to })
            }
            // The caller has not been asked at this step yet, so nothing is counted.
            _ => Ok(TurnOutcome::Reprompt {
                step: IntakeStep::ValidateAddress,
                reason: RepromptReason::AddressIncomplete(check.missing),
                counted: false,
            }),
        }
    }

    fn handle_address_correction(
        &self,
        session: &mut IntakeSession,
        transcript: &str,
        now: Timestamp,
    ) -> Result<TurnOutcome, IntakeError> {
        let (candidate, check) =
            self.best_address_candidate(session.address_draft.as_deref(), transcript);
        if !candidate.is_empty() {
            session.address_draft = Some(candidate.clone());
        }

        match check.corrected {
            Some(corrected) if check.valid => {
                session.record.address =
                    Some(Collected::Provided(Address::verified(corrected, candidate)));
                self.move_on(session, IntakeStep::ValidateAddress, now)
            }
            _ => self.fail(session, RepromptReason::AddressIncomplete(check.missing), now),
        }
    }

    fn handle_confirmation(
        &self,
        session: &mut IntakeSession,
        transcript: &str,
        now: Timestamp,
    ) -> Result<TurnOutcome, IntakeError> {
        let slots = self.offered_slots(session);
        let current = session
            .record
            .selected_appointment
            .as_ref()
            .and_then(|selected| slots.iter().position(|slot| slot == selected));

        if let Some(choice) = extract::extract_slot_choice(transcript, &slots) {
            if Some(choice) != current {
                session.record.selected_appointment = slots.get(choice).cloned();
                return self.fail(session, RepromptReason::SlotChanged, now);
            }
        }

        match extract::extract_confirmation(transcript) {
            Some(true) => {
                if !session.record.is_complete() {
                    return Err(IntakeError::IncompleteRecord(session.call_id.clone()));
                }
                session.complete(now)?;
                Ok(TurnOutcome::Completed)
            }
            Some(false) => self.fail(session, RepromptReason::SlotDeclined, now),
            None => self.fail(session, RepromptReason::ConfirmationUnclear, now),
        }
    }

    /// Advances after a successful collection, running any step that needs
    /// no caller input.
    fn move_on(
        &self,
        session: &mut IntakeSession,
        from: IntakeStep,
        now: Timestamp,
    ) -> Result<TurnOutcome, IntakeError> {
        let to = session.advance(now)?;
        match to {
            IntakeStep::ValidateAddress => self.validate_on_entry(session, from, now),
            IntakeStep::OfferAppointments => {
                session.slots_offered_at = Some(now);
                Ok(TurnOutcome::Advanced { from, to })
            }
            _ => Ok(TurnOutcome::Advanced { from, to }),
        }
    }

    /// Counts a failure and either re-prompts or applies the fallback.
    fn fail(
        &self,
        session: &mut IntakeSession,
        reason: RepromptReason,
        now: Timestamp,
    ) -> Result<TurnOutcome, IntakeError> {
        let step = session.step;
        let retries = session.record_failure(now);
        if self.policy.decide(retries) == RetryDecision::Continue {
            return Ok(TurnOutcome::Reprompt {
                step,
                reason,
                counted: true,
            });
        }

        let fallback = StepFallback::for_step(step);
        match fallback {
            StepFallback::Abandon => {
                session.abandon(AbandonReason::RetriesExhausted, now)?;
                Ok(TurnOutcome::Abandoned(AbandonReason::RetriesExhausted))
            }
            StepFallback::KeepUnvalidated => {
                let draft = session.address_draft.clone().unwrap_or_default();
                let check = self.validator.check(&draft);
                session.record.address = Some(Collected::Provided(Address::unverified(check.parts, draft)));
                let to = session.advance(now)?;
                Ok(TurnOutcome::FellBack { from: step, to, fallback })
            }
            StepFallback::MarkUnknown => {
                mark_unknown(session, step);
                match self.move_on(session, step, now)? {
                    TurnOutcome::Advanced { to, .. } | TurnOutcome::FellBack { to, .. } => {
                        Ok(TurnOutcome::FellBack { from: step, to, fallback })
                    }
                    other => Ok(other),
                }
            }
        }
    }
}

fn mark_unknown(session: &mut IntakeSession, step: IntakeStep) {
    let record = &mut session.record;
    match step {
        IntakeStep::CollectName => record.name = Some(Collected::Unknown),
        IntakeStep::CollectDOB => record.date_of_birth = Some(Collected::Unknown),
        IntakeStep::CollectInsurance => record.insurance = Some(Collected::Unknown),
        IntakeStep::CollectReferral => record.referral = Some(Collected::Unknown),
        IntakeStep::CollectComplaint => record.chief_complaint = Some(Collected::Unknown),
        IntakeStep::CollectAddress => record.address = Some(Collected::Unknown),
        IntakeStep::CollectContact => record.contact = Some(Collected::Unknown),
        _ => {}
    }
}
