//! HTTP DTOs for the voice webhooks.
//!
//! Field names follow the telephony platform's form encoding. Every field
//! is optional at this layer so a missing `CallSid` can be answered with a
//! 400 instead of a form rejection.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::CallId;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of the call-start webhook.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartCallForm {
    #[serde(rename = "CallSid", default)]
    pub call_sid: Option<String>,
    #[serde(rename = "From", default)]
    pub from: Option<String>,
}

/// Body of the turn webhook posted by a speech gather or redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContinueCallForm {
    #[serde(rename = "CallSid", default)]
    pub call_sid: Option<String>,
    #[serde(rename = "SpeechResult", default)]
    pub speech_result: Option<String>,
    /// Sent as text; unparseable values are ignored.
    #[serde(rename = "Confidence", default)]
    pub confidence: Option<String>,
}

impl ContinueCallForm {
    pub fn confidence(&self) -> Option<f32> {
        self.confidence
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f32>().ok())
            .filter(|c| c.is_finite())
    }
}

/// Body of the call-status callback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallStatusForm {
    #[serde(rename = "CallSid", default)]
    pub call_sid: Option<String>,
    #[serde(rename = "CallStatus", default)]
    pub call_status: Option<String>,
}

/// Parses the call id shared by every webhook.
pub fn parse_call_sid(raw: Option<&str>) -> Result<CallId, ErrorResponse> {
    let raw = raw
        .map(str::trim)
        .filter(|sid| !sid.is_empty())
        .ok_or_else(|| ErrorResponse::bad_request("CallSid is required"))?;
    CallId::new(raw).map_err(|e| ErrorResponse::bad_request(e.to_string()))
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }
}
