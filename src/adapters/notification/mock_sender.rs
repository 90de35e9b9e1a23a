//! Mock Notification Sender for testing.
//!
//! Records every notice it is asked to deliver and can be told to fail
//! a number of times first, for exercising the dispatcher's retries.
//!
//! # Example
//!
//! ```ignore
//! let sender = MockNotificationSender::new()
//!     .with_failures(2, NotificationError::network("reset"));
//!
//! dispatcher.dispatch(notice);
//! assert_eq!(sender.delivered().len(), 1);
//! ```

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::domain::intake::IntakeNotice;
use crate::ports::{NotificationError, NotificationSender};

#[derive(Debug, Default)]
struct MockState {
    attempts: u32,
    failures_left: u32,
    failure: Option<NotificationError>,
    delivered: Vec<IntakeNotice>,
}

/// Mock sender with shared, inspectable state.
#[derive(Debug, Clone, Default)]
pub struct MockNotificationSender {
    state: Arc<Mutex<MockState>>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the next `count` sends with `error`.
    pub fn with_failures(self, count: u32, error: NotificationError) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.failures_left = count;
            state.failure = Some(error);
        }
        self
    }

    /// Fails every send with `error`.
    pub fn always_failing(self, error: NotificationError) -> Self {
        self.with_failures(u32::MAX, error)
    }

    /// Notices delivered successfully, in order.
    pub fn delivered(&self) -> Vec<IntakeNotice> {
        self.state.lock().unwrap().delivered.clone()
    }

    /// Total send attempts, including failures.
    pub fn attempts(&self) -> u32 {
        self.state.lock().unwrap().attempts
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send(&self, notice: &IntakeNotice) -> Result<(), NotificationError> {
        let mut state = self.state.lock().unwrap();
        state.attempts += 1;

        if state.failures_left > 0 {
            state.failures_left -= 1;
            if let Some(error) = state.failure.clone() {
                return Err(error);
            }
        }

        state.delivered.push(notice.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
