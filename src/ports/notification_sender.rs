//! Notification Sender Port - Delivers completed intakes to staff.

use async_trait::async_trait;

use crate::domain::intake::IntakeNotice;

/// Errors that can occur while delivering a notice.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum NotificationError {
    /// Sender is missing credentials or recipients.
    #[error("notification sender not configured: {0}")]
    NotConfigured(String),

    /// Request could not reach the provider.
    #[error("network error: {0}")]
    Network(String),

    /// Provider answered with an error status.
    #[error("provider rejected notice with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Provider did not answer in time.
    #[error("timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl NotificationError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Returns true if another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotConfigured(_) => false,
            Self::Network(_) | Self::Timeout { .. } => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// Port for delivering completed intake notices.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notice: &IntakeNotice) -> Result<(), NotificationError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}
