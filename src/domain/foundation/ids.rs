//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Longest call identifier accepted from the telephony platform.
pub const MAX_CALL_ID_LENGTH: usize = 128;

/// Identifier issued by the telephony platform for one phone call.
///
/// Opaque to this service; Twilio sends a `CallSid` such as `CA` followed by
/// 32 hex characters, but any non-empty token without whitespace is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CallId(String);

impl CallId {
    /// Creates a CallId, validating the raw token.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("call_id"));
        }
        if trimmed.len() > MAX_CALL_ID_LENGTH {
            return Err(ValidationError::invalid_format(
                "call_id",
                format!("longer than {} characters", MAX_CALL_ID_LENGTH),
            ));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::invalid_format(
                "call_id",
                "contains whitespace",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CallId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CallId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CallId> for String {
    fn from(id: CallId) -> Self {
        id.0
    }
}

/// Identifier of one confirmation dispatch, used as the email idempotency key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DispatchId(Uuid);

impl DispatchId {
    /// Creates a new random DispatchId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DispatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_id_accepts_twilio_call_sid() {
        let id = CallId::new("CA0123456789abcdef0123456789abcdef").unwrap();
        assert_eq!(id.as_str(), "CA0123456789abcdef0123456789abcdef");
    }

    #[test]
    fn call_id_trims_surrounding_whitespace() {
        let id: CallId = "  CA42 ".parse().unwrap();
        assert_eq!(id.to_string(), "CA42");
    }

    #[test]
    fn call_id_rejects_empty() {
        assert!(CallId::new("   ").is_err());
    }

    #[test]
    fn call_id_rejects_inner_whitespace() {
        assert!(CallId::new("CA 42").is_err());
    }

    #[test]
    fn call_id_rejects_overlong_tokens() {
        let raw = "C".repeat(MAX_CALL_ID_LENGTH + 1);
        assert!(CallId::new(raw).is_err());
    }

    #[test]
    fn call_id_serde_validates() {
        let id: CallId = serde_json::from_str("\"CA42\"").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"CA42\"");
        assert!(serde_json::from_str::<CallId>("\"\"").is_err());
    }

    #[test]
    fn dispatch_ids_are_unique() {
        assert_ne!(DispatchId::new(), DispatchId::new());
    }
}
