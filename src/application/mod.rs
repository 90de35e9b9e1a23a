//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports:
//! the call handlers drive the state machine through the session store, and
//! the dispatcher delivers completed intakes.

pub mod dispatch;
pub mod handlers;

pub use dispatch::ConfirmationDispatcher;
pub use handlers::{
    CallHandlerError, CallStatusCommand, CallStatusHandler, CallStatusResult,
    ContinueCallCommand, ContinueCallHandler, ContinueCallResult, StartCallCommand,
    StartCallHandler, StartCallResult,
};
