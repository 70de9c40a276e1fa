//! Post-sync reconciliation of the destination table.

use metrics::counter;
use tracing::info;

use crate::error::{ErrorKind, SyncResult};
use crate::metrics::{RUN_ID_LABEL, SYNC_ORPHANS_DELETED_TOTAL};
use crate::store::base::Store;
use crate::sync_error;
use crate::types::RunId;

/// Deletes destination rows whose key no longer exists in the source.
///
/// Runs once per run, single-threaded, after every partition has succeeded.
/// The pipelines only ever insert or update, so this pass is what repairs
/// drift caused by source deletions between runs. The delete is one
/// set-difference statement against the store, not a per-row loop.
pub async fn reconcile_orphans<S: Store>(store: &S, run_id: RunId) -> SyncResult<u64> {
    let removed = store.delete_orphans().await.map_err(|err| {
        sync_error!(
            ErrorKind::ReconciliationFailed,
            "Failed to delete orphaned destination rows",
            source: err
        )
    })?;

    counter!(
        SYNC_ORPHANS_DELETED_TOTAL,
        RUN_ID_LABEL => run_id.to_string(),
    )
    .increment(removed);

    info!(run_id, removed, "reconciliation removed orphaned destination rows");

    Ok(removed)
}
