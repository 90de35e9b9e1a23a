//! ResponseComposer - Turns a turn outcome into voice instructions.
//!
//! The output is transport-neutral; the HTTP adapter renders it as TwiML.

use serde::Serialize;

use super::prompts;
use super::{IntakeSession, IntakeStep, RepromptReason, TurnOutcome, TurnResult};

/// Default seconds to wait for speech.
pub const DEFAULT_LISTEN_TIMEOUT_SECS: u32 = 5;

/// One thing for the telephony platform to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Instruction {
    Say { text: String },
    Listen { timeout_secs: u32 },
    Hangup,
}

/// What the call should do after the instructions play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    ContinueListening,
    RepeatWithHint,
    EndCall,
}

/// The reply to one webhook turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceResponse {
    pub instructions: Vec<Instruction>,
    pub directive: Directive,
}

impl VoiceResponse {
    /// All spoken text, joined with spaces.
    pub fn spoken_text(&self) -> String {
        self.instructions
            .iter()
            .filter_map(|instruction| match instruction {
                Instruction::Say { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn ends_call(&self) -> bool {
        self.directive == Directive::EndCall
    }
}

/// Builds deterministic replies from turn outcomes.
#[derive(Debug, Clone, Copy)]
pub struct ResponseComposer {
    listen_timeout_secs: u32,
}

impl ResponseComposer {
    pub fn new(listen_timeout_secs: u32) -> Self {
        Self { listen_timeout_secs }
    }

    /// Composes the reply for `result`, reading the post-turn `session`.
    pub fn compose(&self, session: &IntakeSession, result: &TurnResult) -> VoiceResponse {
        match &result.outcome {
            TurnOutcome::Greeted => self.listen(
                vec![prompts::prompt_for_step(IntakeStep::Greeting).to_string()],
                Directive::ContinueListening,
            ),
            TurnOutcome::Advanced { from, to } => {
                let mut lines = vec![self.acknowledgement(session, *from)];
                lines.extend(self.step_prompt(session, result, *to));
                self.listen(lines, Directive::ContinueListening)
            }
            TurnOutcome::Reprompt { step, reason, .. } => {
                let mut lines = vec![prompts::reprompt_lead(reason).to_string()];
                lines.extend(self.reprompt_body(session, result, *step, reason));
                self.listen(lines, Directive::RepeatWithHint)
            }
            TurnOutcome::FellBack { to, .. } => {
                let mut lines = vec![prompts::FALLBACK_LEAD.to_string()];
                lines.extend(self.step_prompt(session, result, *to));
                self.listen(lines, Directive::ContinueListening)
            }
            TurnOutcome::Resumed(step) => {
                self.listen(self.step_prompt(session, result, *step), Directive::ContinueListening)
            }
            TurnOutcome::Completed => self.hang_up(prompts::completion_message(
                session.record.selected_appointment.as_ref(),
            )),
            TurnOutcome::Abandoned(reason) => {
                self.hang_up(prompts::abandon_message(*reason).to_string())
            }
            TurnOutcome::AlreadyFinished => self.hang_up(prompts::ALREADY_FINISHED.to_string()),
        }
    }

    /// Re-asks the current step without any outcome, for fail-safe replies.
    pub fn repeat_current(&self, session: &IntakeSession, result: &TurnResult) -> VoiceResponse {
        if session.is_finished() {
            return self.hang_up(prompts::ALREADY_FINISHED.to_string());
        }
        let mut lines = vec![prompts::reprompt_lead(&RepromptReason::NotUnderstood).to_string()];
        lines.extend(self.step_prompt(session, result, session.step));
        self.listen(lines, Directive::RepeatWithHint)
    }

    /// Reply used when no session state could be read at all.
    pub fn technical_difficulty(&self) -> VoiceResponse {
        self.listen(
            vec![prompts::TECHNICAL_DIFFICULTY.to_string()],
            Directive::RepeatWithHint,
        )
    }

    fn acknowledgement(&self, session: &IntakeSession, from: IntakeStep) -> String {
        match (from, session.record.display_name()) {
            (IntakeStep::CollectName, Some(name)) => {
                let first = name.split_whitespace().next().unwrap_or(name);
                format!("Thank you, {}.", first)
            }
            _ => prompts::acknowledgement_for_step(from).to_string(),
        }
    }

    fn step_prompt(&self, session: &IntakeSession, result: &TurnResult, step: IntakeStep) -> Vec<String> {
        match step {
            IntakeStep::OfferAppointments => vec![
                prompts::slot_listing(&result.offered_slots),
                prompts::prompt_for_step(step).to_string(),
            ],
            IntakeStep::ConfirmAppointment => vec![prompts::confirm_question(
                session.record.selected_appointment.as_ref(),
            )],
            _ => vec![prompts::prompt_for_step(step).to_string()],
        }
    }

    fn reprompt_body(
        &self,
        session: &IntakeSession,
        result: &TurnResult,
        step: IntakeStep,
        reason: &RepromptReason,
    ) -> Vec<String> {
        match reason {
            RepromptReason::InsurancePartial(part) => {
                vec![prompts::insurance_part_question(*part).to_string()]
            }
            RepromptReason::AddressIncomplete(missing) => {
                vec![prompts::missing_address_question(missing)]
            }
            RepromptReason::SlotDeclined => vec![
                prompts::slot_listing(&result.offered_slots),
                prompts::prompt_for_step(IntakeStep::OfferAppointments).to_string(),
            ],
            _ => self.step_prompt(session, result, step),
        }
    }

    fn listen(&self, lines: Vec<String>, directive: Directive) -> VoiceResponse {
        let mut instructions: Vec<Instruction> = lines
            .into_iter()
            .filter(|line| !line.is_empty())
            .map(|text| Instruction::Say { text })
            .collect();
        instructions.push(Instruction::Listen {
            timeout_secs: self.listen_timeout_secs,
        });
        VoiceResponse {
            instructions,
            directive,
        }
    }

    fn hang_up(&self, text: String) -> VoiceResponse {
        VoiceResponse {
            instructions: vec![Instruction::Say { text }, Instruction::Hangup],
            directive: Directive::EndCall,
        }
    }
}

impl Default for ResponseComposer {
    fn default() -> Self {
        Self::new(DEFAULT_LISTEN_TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CallId, Timestamp};
    use crate::domain::intake::{AbandonReason, Collected, InsurancePart};
    use crate::domain::scheduling::AppointmentGenerator;
    use crate::domain::validation::AddressComponent;

    fn session() -> IntakeSession {
        IntakeSession::new(CallId::new("CA7").unwrap(), Timestamp::now())
    }

    fn result(outcome: TurnOutcome) -> TurnResult {
        TurnResult {
            outcome,
            offered_slots: Vec::new(),
        }
    }

    fn composer() -> ResponseComposer {
        ResponseComposer::default()
    }

    #[test]
    fn greeting_listens() {
        let response = composer().compose(&session(), &result(TurnOutcome::Greeted));
        assert_eq!(response.directive, Directive::ContinueListening);
        assert!(response.spoken_text().contains("Thank you for calling"));
        assert_eq!(
            response.instructions.last(),
            Some(&Instruction::Listen { timeout_secs: 5 })
        );
    }

    #[test]
    fn advancing_from_name_thanks_by_first_name() {
        let mut session = session();
        session.record.name = Some(Collected::Provided("Jane Doe".to_string()));
        let response = composer().compose(
            &session,
            &result(TurnOutcome::Advanced {
                from: IntakeStep::CollectName,
                to: IntakeStep::CollectDOB,
            }),
        );
        assert_eq!(
            response.spoken_text(),
            "Thank you, Jane. What is your date of birth?"
        );
    }

    #[test]
    fn address_reprompt_names_missing_parts() {
        let missing = [
            AddressComponent::StreetNumber,
            AddressComponent::City,
            AddressComponent::State,
            AddressComponent::Zip,
        ]
        .into_iter()
        .collect();
        let response = composer().compose(
            &session(),
            &result(TurnOutcome::Reprompt {
                step: IntakeStep::ValidateAddress,
                reason: RepromptReason::AddressIncomplete(missing),
                counted: true,
            }),
        );
        assert_eq!(response.directive, Directive::RepeatWithHint);
        assert!(response
            .spoken_text()
            .ends_with("Please tell me the street number, city, state, and ZIP code."));
    }

    #[test]
    fn partial_insurance_asks_for_other_part() {
        let response = composer().compose(
            &session(),
            &result(TurnOutcome::Reprompt {
                step: IntakeStep::CollectInsurance,
                reason: RepromptReason::InsurancePartial(InsurancePart::MemberId),
                counted: false,
            }),
        );
        assert_eq!(response.spoken_text(), "Thank you. What is your member ID number?");
    }

    #[test]
    fn offer_lists_slots() {
        let slots = AppointmentGenerator::default().generate(Timestamp::now(), 3);
        let response = composer().compose(
            &session(),
            &TurnResult {
                outcome: TurnOutcome::Advanced {
                    from: IntakeStep::CollectContact,
                    to: IntakeStep::OfferAppointments,
                },
                offered_slots: slots,
            },
        );
        let text = response.spoken_text();
        assert!(text.contains("Option one: Dr. Sarah Johnson"));
        assert!(text.contains("Option three: Dr. Emily Rodriguez"));
    }

    #[test]
    fn completion_hangs_up() {
        let response = composer().compose(&session(), &result(TurnOutcome::Completed));
        assert!(response.ends_call());
        assert_eq!(response.instructions.last(), Some(&Instruction::Hangup));
    }

    #[test]
    fn abandonment_hangs_up() {
        let response = composer().compose(
            &session(),
            &result(TurnOutcome::Abandoned(AbandonReason::RetriesExhausted)),
        );
        assert!(response.ends_call());
        assert!(response.spoken_text().contains("call our office"));
    }

    #[test]
    fn fallback_moves_on_without_hint_directive() {
        let response = composer().compose(
            &session(),
            &result(TurnOutcome::FellBack {
                from: IntakeStep::CollectInsurance,
                to: IntakeStep::CollectReferral,
                fallback: crate::domain::intake::StepFallback::MarkUnknown,
            }),
        );
        assert_eq!(response.directive, Directive::ContinueListening);
        assert!(response.spoken_text().contains("referral"));
    }

    #[test]
    fn technical_difficulty_keeps_listening() {
        let response = composer().technical_difficulty();
        assert!(!response.ends_call());
        assert!(matches!(response.instructions.last(), Some(Instruction::Listen { .. })));
    }

    #[test]
    fn repeat_current_reasks_step() {
        let mut session = session();
        session.advance(Timestamp::now()).unwrap();
        let response = composer().repeat_current(&session, &result(TurnOutcome::Resumed(session.step)));
        assert_eq!(response.directive, Directive::RepeatWithHint);
        assert!(response.spoken_text().contains("full name"));
    }
}
