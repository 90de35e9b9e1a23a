//! Patient Intake - Telephony webhook service for new-patient interviews.
//!
//! A caller is walked through a fixed sequence of questions (name, date of
//! birth, insurance, referral, reason for visit, address, contact details)
//! and offered appointment slots. Each webhook turn is applied to a per-call
//! session by a deterministic state machine; completed intakes are delivered
//! to the scheduling team in the background.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
