//! Notification Adapters
//!
//! Implementations of the NotificationSender port.
//!
//! - **ResendSender** - Emails the scheduling team via Resend
//! - **LoggingSender** - Logs the notice when no provider is configured
//! - **MockNotificationSender** - Records notices for tests

mod logging_sender;
mod mock_sender;
mod resend_sender;

pub use logging_sender::LoggingSender;
pub use mock_sender::MockNotificationSender;
pub use resend_sender::{ResendConfig, ResendSender};
