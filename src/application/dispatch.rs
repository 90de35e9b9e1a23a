//! ConfirmationDispatcher - Delivers completed intakes in the background.
//!
//! Delivery never blocks the caller's turn and never changes the session:
//! failures are retried with linear backoff and then logged.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::intake::IntakeNotice;
use crate::ports::NotificationSender;

/// Fire-and-forget sender with bounded retries.
#[derive(Clone)]
pub struct ConfirmationDispatcher {
    sender: Arc<dyn NotificationSender>,
    max_attempts: u32,
    backoff: Duration,
}

impl ConfirmationDispatcher {
    pub fn new(sender: Arc<dyn NotificationSender>) -> Self {
        Self {
            sender,
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }

    /// At least one attempt is always made.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Attempt `n` waits `n * backoff` before retrying.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Spawns delivery and returns immediately.
    pub fn dispatch(&self, notice: IntakeNotice) -> JoinHandle<bool> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.deliver(&notice).await })
    }

    /// Delivers with retries. Returns true once a send succeeds.
    pub async fn deliver(&self, notice: &IntakeNotice) -> bool {
        for attempt in 1..=self.max_attempts {
            match self.sender.send(notice).await {
                Ok(()) => {
                    info!(
                        call_id = %notice.call_id,
                        dispatch_id = %notice.dispatch_id,
                        sender = self.sender.name(),
                        attempt,
                        "Intake notice delivered"
                    );
                    return true;
                }
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        call_id = %notice.call_id,
                        sender = self.sender.name(),
                        attempt,
                        error = %e,
                        "Intake notice delivery failed, retrying"
                    );
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                Err(e) => {
                    error!(
                        call_id = %notice.call_id,
                        dispatch_id = %notice.dispatch_id,
                        sender = self.sender.name(),
                        attempt,
                        error = %e,
                        fields = %notice.record.completion_summary(),
                        "Intake notice could not be delivered"
                    );
                    return false;
                }
            }
        }
        false
    }
}
