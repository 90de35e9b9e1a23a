//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SessionStore` - Per-call session state with atomic updates
//! - `NotificationSender` - Delivery of completed intake notices

mod notification_sender;
mod session_store;

pub use notification_sender::{NotificationError, NotificationSender};
pub use session_store::{SessionLookup, SessionMutator, SessionStore, SessionStoreError};
