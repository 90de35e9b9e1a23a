//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, validation errors and the state machine trait
//! that the intake domain is built on.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{CallId, DispatchId, MAX_CALL_ID_LENGTH};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
