//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - Session store implementations
//! - `notification` - Delivery of completed intakes (Resend, log, mock)
//! - `http` - Telephony webhooks and TwiML rendering
//! - `sweeper` - Background expiry of idle sessions

pub mod http;
pub mod notification;
pub mod storage;
pub mod sweeper;

pub use notification::{LoggingSender, MockNotificationSender, ResendConfig, ResendSender};
pub use storage::InMemorySessionStore;
pub use sweeper::{SessionSweeper, SessionSweeperConfig, SweepReport};
