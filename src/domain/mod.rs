//! Domain layer containing the intake interview logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, errors, state machine trait)
//! - `intake` - Session state, step machine, extraction, prompts
//! - `validation` - Address validation
//! - `scheduling` - Appointment slot generation

pub mod foundation;
pub mod intake;
pub mod scheduling;
pub mod validation;
