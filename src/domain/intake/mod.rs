//! Intake domain - the per-call interview.
//!
//! A session walks a fixed sequence of steps, collecting one field per step.
//! [`IntakeStateMachine`] validates each turn and advances the session;
//! [`ResponseComposer`] decides what to say next.

mod errors;
pub mod extract;
mod machine;
mod notice;
mod policy;
pub mod prompts;
mod record;
mod session;
mod status;
mod step;
mod voice;

pub use errors::IntakeError;
pub use machine::{
    InsurancePart, IntakeStateMachine, RepromptReason, Turn, TurnOutcome, TurnResult,
    DEFAULT_SLOT_COUNT,
};
pub use notice::IntakeNotice;
pub use policy::{RetryDecision, RetryPolicy, StepFallback, DEFAULT_MAX_RETRIES};
pub use record::{
    Address, Collected, Contact, FieldState, Insurance, PartialInsurance, PatientRecord, Referral,
};
pub use session::IntakeSession;
pub use status::{AbandonReason, SessionStatus};
pub use step::IntakeStep;
pub use voice::{Directive, Instruction, ResponseComposer, VoiceResponse, DEFAULT_LISTEN_TIMEOUT_SECS};
