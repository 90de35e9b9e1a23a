//! In-Memory Session Store Adapter
//!
//! Keeps sessions in a map of per-call mutexes. The map lock is held only
//! to find or insert a call's handle, so turns for different calls never
//! wait on each other.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use crate::domain::foundation::{CallId, Timestamp};
use crate::domain::intake::{AbandonReason, IntakeSession};
use crate::ports::{SessionLookup, SessionMutator, SessionStore, SessionStoreError};

type SessionHandle = Arc<Mutex<IntakeSession>>;

/// In-memory storage for intake sessions
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<CallId, SessionHandle>>>,
}

impl InMemorySessionStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    async fn handle(&self, call_id: &CallId) -> Option<SessionHandle> {
        self.sessions.read().await.get(call_id).cloned()
    }

    async fn all_handles(&self) -> Vec<SessionHandle> {
        self.sessions.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(
        &self,
        call_id: &CallId,
        now: Timestamp,
    ) -> Result<SessionLookup, SessionStoreError> {
        if let Some(handle) = self.handle(call_id).await {
            let session = handle.lock().await.clone();
            return Ok(SessionLookup {
                session,
                created: false,
            });
        }

        let (handle, created) = {
            let mut sessions = self.sessions.write().await;
            match sessions.get(call_id) {
                // Another turn inserted it between our read and write.
                Some(existing) => (existing.clone(), false),
                None => {
                    let handle = Arc::new(Mutex::new(IntakeSession::new(call_id.clone(), now)));
                    sessions.insert(call_id.clone(), handle.clone());
                    (handle, true)
                }
            }
        };

        let session = handle.lock().await.clone();
        Ok(SessionLookup { session, created })
    }

    async fn get(&self, call_id: &CallId) -> Result<Option<IntakeSession>, SessionStoreError> {
        match self.handle(call_id).await {
            Some(handle) => Ok(Some(handle.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        call_id: &CallId,
        mutator: &mut SessionMutator<'_>,
    ) -> Result<IntakeSession, SessionStoreError> {
        let handle = self
            .handle(call_id)
            .await
            .ok_or_else(|| SessionStoreError::NotFound(call_id.clone()))?;

        let mut guard = handle.lock().await;
        let mut working = guard.clone();
        mutator(&mut working)?;
        *guard = working.clone();
        Ok(working)
    }

    async fn expire_stale(
        &self,
        now: Timestamp,
        timeout_secs: u64,
    ) -> Result<Vec<CallId>, SessionStoreError> {
        let mut expired = Vec::new();
        for handle in self.all_handles().await {
            let mut session = handle.lock().await;
            if !session.is_stale(timeout_secs, &now) {
                continue;
            }
            match session.abandon(AbandonReason::InactivityTimeout, now) {
                Ok(()) => expired.push(session.call_id.clone()),
                Err(err) => warn!(
                    call_id = %session.call_id,
                    error = %err,
                    "Could not expire stale session"
                ),
            }
        }
        Ok(expired)
    }

    async fn purge_finished(
        &self,
        now: Timestamp,
        retention_secs: u64,
    ) -> Result<Vec<CallId>, SessionStoreError> {
        let mut purged = Vec::new();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|call_id, handle| {
            // A locked session is mid-turn and therefore not finished.
            let Ok(session) = handle.try_lock() else {
                return true;
            };
            let expired = session.is_finished() && session.updated_at.has_elapsed(retention_secs, &now);
            if expired {
                purged.push(call_id.clone());
            }
            !expired
        });
        Ok(purged)
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::intake::{IntakeError, IntakeStep, SessionStatus};
    use std::time::Duration;

    fn call(id: &str) -> CallId {
        CallId::new(id).unwrap()
    }

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_unix_secs(secs).unwrap()
    }

    mod lookup {
        use super::*;

        #[tokio::test]
        async fn first_lookup_creates_session() {
            let store = InMemorySessionStore::new();

            let first = store.get_or_create(&call("CA1"), at(100)).await.unwrap();
            let second = store.get_or_create(&call("CA1"), at(200)).await.unwrap();

            assert!(first.created);
            assert!(!second.created);
            assert_eq!(second.session.created_at, at(100));
            assert_eq!(store.len().await, 1);
        }

        #[tokio::test]
        async fn get_unknown_is_none() {
            let store = InMemorySessionStore::new();
            assert!(store.get(&call("CA404")).await.unwrap().is_none());
            assert!(store.is_empty().await);
        }
    }

    mod update {
        use super::*;

        #[tokio::test]
        async fn commits_successful_mutation() {
            let store = InMemorySessionStore::new();
            store.get_or_create(&call("CA1"), at(0)).await.unwrap();

            let updated = store
                .update(&call("CA1"), &mut |s: &mut IntakeSession| {
                    s.advance(at(5)).map(|_| ())
                })
                .await
                .unwrap();

            assert_eq!(updated.step, IntakeStep::CollectName);
            let stored = store.get(&call("CA1")).await.unwrap().unwrap();
            assert_eq!(stored, updated);
        }

        #[tokio::test]
        async fn failed_mutation_leaves_snapshot_untouched() {
            let store = InMemorySessionStore::new();
            let before = store.get_or_create(&call("CA1"), at(0)).await.unwrap().session;

            let result = store
                .update(&call("CA1"), &mut |s: &mut IntakeSession| {
                    s.retry_count = 99;
                    Err(IntakeError::SessionFinished(s.call_id.clone()))
                })
                .await;

            assert!(matches!(result, Err(SessionStoreError::Rejected(_))));
            assert_eq!(store.get(&call("CA1")).await.unwrap().unwrap(), before);
        }

        #[tokio::test]
        async fn unknown_call_is_not_found() {
            let store = InMemorySessionStore::new();
            let result = store
                .update(&call("CA404"), &mut |_: &mut IntakeSession| Ok(()))
                .await;
            assert!(matches!(result, Err(SessionStoreError::NotFound(_))));
        }

        #[tokio::test]
        async fn concurrent_updates_to_one_call_are_serialised() {
            let store = InMemorySessionStore::new();
            store.get_or_create(&call("CA1"), at(0)).await.unwrap();

            let mut tasks = Vec::new();
            for _ in 0..50 {
                let store = store.clone();
                tasks.push(tokio::spawn(async move {
                    store
                        .update(&call("CA1"), &mut |s: &mut IntakeSession| {
                            s.retry_count += 1;
                            Ok(())
                        })
                        .await
                        .unwrap();
                }));
            }
            for task in tasks {
                task.await.unwrap();
            }

            let stored = store.get(&call("CA1")).await.unwrap().unwrap();
            assert_eq!(stored.retry_count, 50);
        }

        #[tokio::test]
        async fn other_calls_proceed_while_one_is_locked() {
            let store = InMemorySessionStore::new();
            store.get_or_create(&call("CA1"), at(0)).await.unwrap();
            store.get_or_create(&call("CA2"), at(0)).await.unwrap();

            let handle = store.handle(&call("CA1")).await.unwrap();
            let _held = handle.lock().await;

            let result = tokio::time::timeout(
                Duration::from_secs(1),
                store.update(&call("CA2"), &mut |s: &mut IntakeSession| {
                    s.retry_count = 1;
                    Ok(())
                }),
            )
            .await;

            assert!(result.is_ok());
        }
    }

    mod sweeping {
        use super::*;

        #[tokio::test]
        async fn expire_stale_abandons_idle_sessions() {
            let store = InMemorySessionStore::new();
            store.get_or_create(&call("CA-idle"), at(0)).await.unwrap();
            store.get_or_create(&call("CA-busy"), at(500)).await.unwrap();

            let expired = store.expire_stale(at(700), 600).await.unwrap();

            assert_eq!(expired, vec![call("CA-idle")]);
            let idle = store.get(&call("CA-idle")).await.unwrap().unwrap();
            assert_eq!(idle.status, SessionStatus::Abandoned);
            assert_eq!(idle.abandon_reason, Some(AbandonReason::InactivityTimeout));
            let busy = store.get(&call("CA-busy")).await.unwrap().unwrap();
            assert!(busy.status.is_active());
        }

        #[tokio::test]
        async fn expire_stale_ignores_finished_sessions() {
            let store = InMemorySessionStore::new();
            store.get_or_create(&call("CA1"), at(0)).await.unwrap();
            store
                .update(&call("CA1"), &mut |s: &mut IntakeSession| {
                    s.abandon(AbandonReason::CallerHungUp, at(0))
                })
                .await
                .unwrap();

            assert!(store.expire_stale(at(10_000), 600).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn purge_removes_only_finished_sessions_past_retention() {
            let store = InMemorySessionStore::new();
            store.get_or_create(&call("CA-old"), at(0)).await.unwrap();
            store.get_or_create(&call("CA-active"), at(0)).await.unwrap();
            store
                .update(&call("CA-old"), &mut |s: &mut IntakeSession| {
                    s.abandon(AbandonReason::CallerHungUp, at(0))
                })
                .await
                .unwrap();

            assert!(store.purge_finished(at(3_000), 3_600).await.unwrap().is_empty());

            let purged = store.purge_finished(at(3_601), 3_600).await.unwrap();
            assert_eq!(purged, vec![call("CA-old")]);
            assert_eq!(store.len().await, 1);
            assert!(store.get(&call("CA-active")).await.unwrap().is_some());
        }
    }
}
