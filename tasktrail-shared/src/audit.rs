/// Pre-update snapshot capture for tasks
///
/// Every mutation of an existing task (field updates and archiving alike)
/// first records what the task looked like before the change. The snapshot
/// lives in the task's single activity-log row and is overwritten each
/// time, giving one level of "what was this before" rather than a full
/// history.
///
/// Handlers call [`capture_snapshot`] explicitly, immediately before
/// persisting the change; there is no save hook.
///
/// # Algorithm
///
/// 1. Load the task's currently-persisted row, archived or not. If no row
///    exists the capture is skipped silently.
/// 2. Upsert the task's activity-log row with that row's assignee, status,
///    and due date as the "previous" values.
///
/// The capture runs unconditionally, whether or not the pending change
/// actually differs from the stored row. The log answers "what was this
/// task before the most recent save", not "when did it last change".

use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::activity_log::ActivityLog;
use crate::models::task::Task;

/// Captures the pre-update snapshot of a task
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `task_id` - The task about to be mutated
///
/// # Returns
///
/// The stored log row, or None when the task no longer exists
///
/// # Errors
///
/// Returns an error only if the database fails; a missing task is not an
/// error
pub async fn capture_snapshot(
    pool: &PgPool,
    task_id: Uuid,
) -> Result<Option<ActivityLog>, sqlx::Error> {
    // Unfiltered load: an archived task being mutated again still
    // snapshots its current state
    let Some(previous) = Task::find_by_id_any(pool, task_id).await? else {
        debug!(task_id = %task_id, "Skipping snapshot capture, task row is gone");
        return Ok(None);
    };

    let log = ActivityLog::upsert_snapshot(pool, &previous).await?;

    debug!(
        task_id = %task_id,
        previous_status = %log.previous_status,
        "Captured pre-update snapshot"
    );

    Ok(Some(log))
}

// Snapshot freshness, overwrite-not-append, and the silent-skip case are
// exercised end to end in the API crate's integration tests
