//! Application handlers.
//!
//! Command handlers that orchestrate the intake domain for each webhook.

pub mod call;

pub use call::{
    CallHandlerError, CallStatusCommand, CallStatusHandler, CallStatusResult,
    ContinueCallCommand, ContinueCallHandler, ContinueCallResult, StartCallCommand,
    StartCallHandler, StartCallResult,
};
