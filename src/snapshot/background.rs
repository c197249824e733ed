//! Fire-and-forget snapshot regeneration.
//!
//! Write actions (intake logging, medication/condition edits) call
//! `spawn_regeneration` to keep snapshots fresh without blocking their own
//! response. A failed pass is logged and swallowed — snapshot freshness is
//! never a correctness dependency of the triggering write.

use std::sync::Arc;
use std::thread::JoinHandle;

use uuid::Uuid;

use super::generator::SnapshotGenerator;
use crate::models::TimeWindow;

/// Handle for an in-flight background regeneration.
///
/// Dropping the handle detaches the task (the normal fire-and-forget path);
/// `join` waits for completion where callers need it (seed flows, tests).
pub struct RegenerationHandle {
    handle: JoinHandle<()>,
}

impl RegenerationHandle {
    pub fn join(self) {
        if self.handle.join().is_err() {
            tracing::error!("Snapshot regeneration thread panicked");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Regenerate a user's snapshot on a background thread.
pub fn spawn_regeneration(
    generator: Arc<SnapshotGenerator>,
    user_id: Uuid,
    time_window: TimeWindow,
) -> RegenerationHandle {
    let handle = std::thread::spawn(move || {
        match generator.generate(&user_id, time_window) {
            Ok(result) if result.success => {
                tracing::debug!(
                    user = %user_id,
                    window = time_window.as_str(),
                    snapshot = %result.snapshot_id,
                    "Snapshot regenerated"
                );
            }
            Ok(result) => {
                tracing::warn!(
                    user = %user_id,
                    window = time_window.as_str(),
                    snapshot = %result.snapshot_id,
                    "Snapshot regenerated via minimal fallback"
                );
            }
            Err(e) => {
                tracing::error!(
                    user = %user_id,
                    window = time_window.as_str(),
                    error = %e,
                    "Snapshot regeneration failed silently"
                );
            }
        }
    });
    RegenerationHandle { handle }
}
