use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, warn};

use user_search_repository::{SearchEngineClient, SnapshotId};

/// Exclusive owner of an open snapshot.
///
/// Call [`SnapshotGuard::release`] to close the snapshot inline. If the guard
/// is dropped instead, the close is spawned onto the current tokio runtime.
/// Either way the snapshot is closed at most once. A failed close is only
/// logged; the engine expires the snapshot after its keep-alive.
pub struct SnapshotGuard {
    client: Arc<dyn SearchEngineClient>,
    snapshot: Option<SnapshotId>,
}

impl SnapshotGuard {
    /// Take ownership of `snapshot`.
    pub fn new(client: Arc<dyn SearchEngineClient>, snapshot: SnapshotId) -> Self {
        Self {
            client,
            snapshot: Some(snapshot),
        }
    }

    /// The guarded snapshot, until released.
    pub fn snapshot(&self) -> Option<&SnapshotId> {
        self.snapshot.as_ref()
    }

    /// Close the snapshot now.
    pub async fn release(mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            close(self.client.as_ref(), &snapshot).await;
        }
    }
}

impl Drop for SnapshotGuard {
    fn drop(&mut self) {
        let Some(snapshot) = self.snapshot.take() else {
            return;
        };

        match Handle::try_current() {
            Ok(handle) => {
                debug!(snapshot = %snapshot, "Export dropped, releasing snapshot");
                let client = self.client.clone();
                handle.spawn(async move {
                    close(client.as_ref(), &snapshot).await;
                });
            }
            Err(_) => {
                warn!(
                    snapshot = %snapshot,
                    "No runtime to release snapshot, leaving it to expire"
                );
            }
        }
    }
}

async fn close(client: &dyn SearchEngineClient, snapshot: &SnapshotId) {
    match client.close_snapshot(snapshot).await {
        Ok(()) => debug!(snapshot = %snapshot, "Released snapshot"),
        Err(e) => warn!(snapshot = %snapshot, error = %e, "Failed to release snapshot"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingEngine, INDEX};
    use std::time::Duration;

    async fn open(engine: &Arc<CountingEngine>) -> SnapshotGuard {
        let snapshot = engine
            .open_snapshot(INDEX, Duration::from_secs(60))
            .await
            .unwrap();
        SnapshotGuard::new(engine.clone(), snapshot)
    }

    #[tokio::test]
    async fn test_release_closes_once() {
        let engine = Arc::new(CountingEngine::with_users(1).await);
        let guard = open(&engine).await;
        assert!(guard.snapshot().is_some());

        guard.release().await;
        engine.wait_for_closes(2).await;

        assert_eq!(engine.closes(), 1);
        assert_eq!(engine.inner.open_snapshot_count().await, 0);
    }

    #[tokio::test]
    async fn test_drop_closes_in_background() {
        let engine = Arc::new(CountingEngine::with_users(1).await);
        let guard = open(&engine).await;

        drop(guard);
        assert_eq!(engine.closes(), 0);
        engine.wait_for_closes(1).await;

        assert_eq!(engine.closes(), 1);
        assert_eq!(engine.inner.open_snapshot_count().await, 0);
    }

    #[tokio::test]
    async fn test_release_failure_is_not_escalated() {
        let engine = Arc::new(CountingEngine::with_users(1).await);
        let guard = SnapshotGuard::new(engine.clone(), SnapshotId::new("already-gone"));

        guard.release().await;

        assert_eq!(engine.closes(), 1);
    }
}
