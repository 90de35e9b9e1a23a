//! Storage Adapters
//!
//! Implementations of the SessionStore port.
//!
//! - **InMemorySessionStore** - Per-call locked map, suitable for a single
//!   server instance

mod in_memory_session_store;

pub use in_memory_session_store::InMemorySessionStore;
