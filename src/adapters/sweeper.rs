//! SessionSweeper - Background service that ends idle calls.
//!
//! Callers who hang up mid-interview do not always trigger a status
//! callback. Each tick the sweeper:
//! 1. abandons active sessions idle past the inactivity timeout
//! 2. removes finished sessions older than the retention window
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 30s | Time between sweeps |
//! | `inactivity_timeout_secs` | 600 | Idle time before abandonment |
//! | `retention_secs` | 3600 | How long finished sessions are kept |
//!
//! ## Graceful Shutdown
//!
//! The loop listens on a `watch` channel and runs one final sweep before
//! returning.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info, warn};

use crate::domain::foundation::Timestamp;
use crate::ports::{SessionStore, SessionStoreError};

/// Configuration for the SessionSweeper service.
#[derive(Debug, Clone)]
pub struct SessionSweeperConfig {
    pub interval: Duration,
    pub inactivity_timeout_secs: u64,
    pub retention_secs: u64,
}

impl Default for SessionSweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            inactivity_timeout_secs: 600,
            retention_secs: 3600,
        }
    }
}

impl SessionSweeperConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_inactivity_timeout(mut self, secs: u64) -> Self {
        self.inactivity_timeout_secs = secs;
        self
    }

    pub fn with_retention(mut self, secs: u64) -> Self {
        self.retention_secs = secs;
        self
    }
}

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: usize,
    pub purged: usize,
}

/// Background service that expires and purges sessions.
pub struct SessionSweeper {
    store: Arc<dyn SessionStore>,
    config: SessionSweeperConfig,
}

impl SessionSweeper {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self::with_config(store, SessionSweeperConfig::default())
    }

    pub fn with_config(store: Arc<dyn SessionStore>, config: SessionSweeperConfig) -> Self {
        Self { store, config }
    }

    /// Run the sweep loop until shutdown signal is received.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), SessionStoreError> {
        let mut interval = time::interval(self.config.interval);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        self.sweep(Timestamp::now()).await?;
                        return Ok(());
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.sweep(Timestamp::now()).await {
                        warn!(error = %e, "Session sweep failed");
                    }
                }
            }
        }
    }

    /// Run exactly one sweep at `now`.
    pub async fn sweep(&self, now: Timestamp) -> Result<SweepReport, SessionStoreError> {
        let expired = self
            .store
            .expire_stale(now, self.config.inactivity_timeout_secs)
            .await?;

        for call_id in &expired {
            match self.store.get(call_id).await? {
                Some(session) => info!(
                    call_id = %call_id,
                    // The entry before `Abandoned` is where the caller went quiet.
                    step = %session.step_history.iter().rev().nth(1).copied().unwrap_or(session.step),
                    retry_count = session.retry_count,
                    fields = %session.record.completion_summary(),
                    "Session abandoned after inactivity"
                ),
                None => info!(call_id = %call_id, "Session abandoned after inactivity"),
            }
        }

        let purged = self
            .store
            .purge_finished(now, self.config.retention_secs)
            .await?;
        if !purged.is_empty() {
            debug!(count = purged.len(), "Purged finished sessions");
        }

        Ok(SweepReport {
            expired: expired.len(),
            purged: purged.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::domain::foundation::CallId;
    use crate::domain::intake::SessionStatus;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_unix_secs(secs).unwrap()
    }

    fn sweeper(store: &InMemorySessionStore) -> SessionSweeper {
        SessionSweeper::with_config(
            Arc::new(store.clone()),
            SessionSweeperConfig::default()
                .with_inactivity_timeout(60)
                .with_retention(120),
        )
    }

    #[tokio::test]
    async fn sweep_expires_then_purges_over_time() {
        let store = InMemorySessionStore::new();
        let call = CallId::new("CA1").unwrap();
        store.get_or_create(&call, at(0)).await.unwrap();
        let sweeper = sweeper(&store);

        let first = sweeper.sweep(at(30)).await.unwrap();
        assert_eq!(first, SweepReport::default());

        let second = sweeper.sweep(at(61)).await.unwrap();
        assert_eq!(second, SweepReport { expired: 1, purged: 0 });
        let session = store.get(&call).await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Abandoned);

        let third = sweeper.sweep(at(182)).await.unwrap();
        assert_eq!(third, SweepReport { expired: 0, purged: 1 });
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_signal() {
        let store = InMemorySessionStore::new();
        let sweeper = SessionSweeper::with_config(
            Arc::new(store),
            SessionSweeperConfig::default().with_interval(Duration::from_millis(10)),
        );
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move { sweeper.run(rx).await });
        time::sleep(Duration::from_millis(30)).await;
        tx.send(true).unwrap();

        let result = time::timeout(Duration::from_secs(1), handle).await;
        assert!(matches!(result, Ok(Ok(Ok(())))));
    }

    #[test]
    fn config_builders() {
        let config = SessionSweeperConfig::default()
            .with_interval(Duration::from_secs(5))
            .with_inactivity_timeout(10)
            .with_retention(20);
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.inactivity_timeout_secs, 10);
        assert_eq!(config.retention_secs, 20);
    }
}
