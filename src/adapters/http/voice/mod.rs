//! HTTP adapter for the telephony voice webhooks.

mod dto;
mod handlers;
mod routes;
mod twiml;

pub use dto::{CallStatusForm, ContinueCallForm, ErrorResponse, StartCallForm};
pub use handlers::VoiceHandlers;
pub use routes::voice_routes;
pub use twiml::{escape as escape_xml, render as render_twiml, TwimlSettings};
