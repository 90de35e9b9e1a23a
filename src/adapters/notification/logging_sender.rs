//! Logging Sender - Writes completed intakes to the log.
//!
//! Used when no email provider is configured, typically in development.

use async_trait::async_trait;
use tracing::info;

use crate::domain::intake::IntakeNotice;
use crate::ports::{NotificationError, NotificationSender};

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSender;

impl LoggingSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSender for LoggingSender {
    async fn send(&self, notice: &IntakeNotice) -> Result<(), NotificationError> {
        info!(
            call_id = %notice.call_id,
            dispatch_id = %notice.dispatch_id,
            subject = %notice.subject(),
            body = %notice.render_text(),
            "Intake notice (no email provider configured)"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
