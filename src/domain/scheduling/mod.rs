//! Appointment slot generation.

mod generator;

pub use generator::{AppointmentGenerator, AppointmentSlot, Provider, PROVIDERS, SLOT_MINUTES};
