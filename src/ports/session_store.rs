//! Session Store Port - Keyed storage for intake sessions.
//!
//! Every call has its own session. Implementations must serialise updates
//! for the same call while letting different calls proceed independently.

use async_trait::async_trait;

use crate::domain::foundation::{CallId, Timestamp};
use crate::domain::intake::{IntakeError, IntakeSession};

/// Errors that can occur during session store operations
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session not found for call: {0}")]
    NotFound(CallId),

    #[error("Update rejected: {0}")]
    Rejected(#[from] IntakeError),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Closure applied to a working copy of a session under its lock.
///
/// Returning `Err` discards the working copy.
pub type SessionMutator<'a> =
    dyn FnMut(&mut IntakeSession) -> Result<(), IntakeError> + Send + 'a;

/// Result of looking up a session that may not exist yet.
#[derive(Debug, Clone)]
pub struct SessionLookup {
    pub session: IntakeSession,
    /// True when this call created the session.
    pub created: bool,
}

/// Port for per-call session state
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session for `call_id`, creating it at `Greeting` if absent.
    async fn get_or_create(
        &self,
        call_id: &CallId,
        now: Timestamp,
    ) -> Result<SessionLookup, SessionStoreError>;

    /// Returns a snapshot, if the session exists.
    async fn get(&self, call_id: &CallId) -> Result<Option<IntakeSession>, SessionStoreError>;

    /// Applies `mutator` atomically and returns the committed session.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id; `Rejected` when the mutator fails, in
    /// which case the stored session is unchanged.
    async fn update(
        &self,
        call_id: &CallId,
        mutator: &mut SessionMutator<'_>,
    ) -> Result<IntakeSession, SessionStoreError>;

    /// Abandons active sessions idle for more than `timeout_secs`.
    async fn expire_stale(
        &self,
        now: Timestamp,
        timeout_secs: u64,
    ) -> Result<Vec<CallId>, SessionStoreError>;

    /// Removes finished sessions last touched more than `retention_secs` ago.
    async fn purge_finished(
        &self,
        now: Timestamp,
        retention_secs: u64,
    ) -> Result<Vec<CallId>, SessionStoreError>;

    /// Number of stored sessions.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
