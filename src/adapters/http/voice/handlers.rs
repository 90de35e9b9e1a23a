//! HTTP handlers for the voice webhooks.
//!
//! Every request with a usable `CallSid` is answered 200 with TwiML, even
//! when the turn could not be applied.

use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Form, Json,
};
use http::{header, StatusCode};
use tracing::error;

use crate::application::{
    CallStatusCommand, CallStatusHandler, ContinueCallCommand, ContinueCallHandler,
    StartCallCommand, StartCallHandler,
};
use crate::domain::intake::{ResponseComposer, VoiceResponse};

use super::dto::{parse_call_sid, CallStatusForm, ContinueCallForm, ErrorResponse, StartCallForm};
use super::twiml::{self, TwimlSettings};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct VoiceHandlers {
    start_handler: Arc<StartCallHandler>,
    continue_handler: Arc<ContinueCallHandler>,
    status_handler: Arc<CallStatusHandler>,
    composer: ResponseComposer,
    twiml: TwimlSettings,
}

impl VoiceHandlers {
    pub fn new(
        start_handler: Arc<StartCallHandler>,
        continue_handler: Arc<ContinueCallHandler>,
        status_handler: Arc<CallStatusHandler>,
        composer: ResponseComposer,
        twiml: TwimlSettings,
    ) -> Self {
        Self {
            start_handler,
            continue_handler,
            status_handler,
            composer,
            twiml,
        }
    }

    fn voice(&self, response: &VoiceResponse) -> Response {
        xml(twiml::render(response, &self.twiml))
    }

    fn technical_difficulty(&self) -> Response {
        self.voice(&self.composer.technical_difficulty())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /voice/start - Greet a newly connected caller
pub async fn start_call(
    State(handlers): State<VoiceHandlers>,
    Form(form): Form<StartCallForm>,
) -> Response {
    let call_id = match parse_call_sid(form.call_sid.as_deref()) {
        Ok(id) => id,
        Err(e) => return bad_request(e),
    };

    let cmd = StartCallCommand {
        call_id,
        caller_number: form.from.filter(|n| !n.trim().is_empty()),
    };

    match handlers.start_handler.handle(cmd).await {
        Ok(result) => handlers.voice(&result.response),
        Err(e) => {
            error!(error = %e, "Call start failed");
            handlers.technical_difficulty()
        }
    }
}

/// POST /voice/continue - Apply one caller utterance
pub async fn continue_call(
    State(handlers): State<VoiceHandlers>,
    Form(form): Form<ContinueCallForm>,
) -> Response {
    let call_id = match parse_call_sid(form.call_sid.as_deref()) {
        Ok(id) => id,
        Err(e) => return bad_request(e),
    };

    let cmd = ContinueCallCommand {
        call_id,
        confidence: form.confidence(),
        transcript: form.speech_result,
    };

    match handlers.continue_handler.handle(cmd).await {
        Ok(result) => handlers.voice(&result.response),
        Err(e) => {
            error!(error = %e, "Call turn failed");
            handlers.technical_difficulty()
        }
    }
}

/// POST /voice/status - Call lifecycle callback
pub async fn call_status(
    State(handlers): State<VoiceHandlers>,
    Form(form): Form<CallStatusForm>,
) -> Response {
    let call_id = match parse_call_sid(form.call_sid.as_deref()) {
        Ok(id) => id,
        Err(e) => return bad_request(e),
    };

    let cmd = CallStatusCommand {
        call_id,
        call_status: form.call_status.unwrap_or_default(),
    };

    if let Err(e) = handlers.status_handler.handle(cmd).await {
        error!(error = %e, "Call status update failed");
    }
    xml(twiml::empty())
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

fn xml(body: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/xml")], body).into_response()
}

fn bad_request(error: ErrorResponse) -> Response {
    (StatusCode::BAD_REQUEST, Json(error)).into_response()
}
