//! Orphan-blob reconciliation.
//!
//! Blob cleanup during update/delete is fire-and-forget, so a failed
//! deletion leaves an unreferenced blob behind. A periodic sweep enumerates
//! the object store, subtracts every key referenced by a live document, and
//! reclaims what remains — skipping blobs younger than a grace period, which
//! may belong to an upload whose document write is still in flight.

use std::sync::Arc;

use chrono::{Duration, Utc};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::object_store::{ObjectStore, ObjectStoreError};
use crate::storage::{Database, DatabaseError};
use crate::AppState;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Store(#[from] ObjectStoreError),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub scanned: u64,
    pub deleted: u64,
}

/// One reconciliation pass.
pub async fn sweep_orphans(
    db: &Database,
    store: &dyn ObjectStore,
    grace: Duration,
) -> Result<SweepStats, ReconcileError> {
    let referenced = db.referenced_media_keys()?;
    let cutoff = Utc::now() - grace;

    let mut stats = SweepStats::default();
    for object in store.list().await? {
        stats.scanned += 1;

        if referenced.contains(&object.key) || object.modified >= cutoff {
            continue;
        }

        match store.delete(&object.key).await {
            Ok(()) => {
                tracing::info!(blob = %object.key, "Reclaimed orphaned blob");
                stats.deleted += 1;
            }
            Err(e) => {
                tracing::warn!(blob = %object.key, error = %e, "Failed to reclaim orphaned blob");
            }
        }
    }

    Ok(stats)
}

/// Run the sweep on the configured interval until the task is aborted.
pub fn spawn(state: Arc<AppState>) -> JoinHandle<()> {
    let interval_secs = state.config.reconcile_interval_secs;
    let grace = Duration::seconds(state.config.reconcile_grace_secs as i64);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        // The first tick fires immediately; skip it so startup stays quiet.
        interval.tick().await;

        loop {
            interval.tick().await;
            match sweep_orphans(&state.db, state.object_store.as_ref(), grace).await {
                Ok(stats) if stats.deleted > 0 => {
                    tracing::info!(
                        scanned = stats.scanned,
                        deleted = stats.deleted,
                        "Reconciliation pass complete"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Reconciliation pass failed");
                }
            }
        }
    })
}
