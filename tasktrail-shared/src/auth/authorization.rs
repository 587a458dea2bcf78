/// Authorization helpers and permission checks
///
/// This module centralizes every role and visibility decision the API makes,
/// so route handlers state *which* check applies and never re-derive the
/// rules. Checks are pure functions over already-loaded rows.
///
/// # Permission Model
///
/// - **Projects**: readable by any authenticated user; created, updated,
///   and archived by admins only
/// - **Tasks**: admins see and edit everything; contributors see only tasks
///   assigned to them and may change only the status
/// - **Task create and archive, export, activity logs**: admin only
///
/// A failed visibility check is indistinguishable from a missing row, so
/// contributors cannot probe for the existence of other people's tasks.
///
/// # Example
///
/// ```
/// use tasktrail_shared::auth::authorization::require_task_delete;
/// use tasktrail_shared::models::user::{User, UserRole};
///
/// # fn example(admin: &User) -> Result<(), Box<dyn std::error::Error>> {
/// // Checked before the task is even looked up
/// require_task_delete(admin)?;
/// # Ok(())
/// # }
/// ```

use crate::models::task::Task;
use crate::models::user::User;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Requester's role does not allow the operation
    #[error("{0}")]
    Forbidden(&'static str),

    /// The row exists but is outside the requester's visibility
    ///
    /// Rendered as a plain not-found so out-of-scope and nonexistent rows
    /// look the same.
    #[error("Not found")]
    NotVisible,
}

/// Requires the admin role for project mutations
///
/// Project reads are open to every authenticated user; create, update, and
/// archive are not.
///
/// # Errors
///
/// Returns `AccessError::Forbidden` for contributors
pub fn require_project_write(user: &User) -> Result<(), AccessError> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(AccessError::Forbidden("Only admins can modify projects"))
    }
}

/// Requires the admin role for creating a task
///
/// # Errors
///
/// Returns `AccessError::Forbidden` for contributors
pub fn require_task_create(user: &User) -> Result<(), AccessError> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(AccessError::Forbidden("Only admins can create tasks"))
    }
}

/// Requires the admin role for archiving a task
///
/// Evaluated before the task is looked up; a contributor gets the same
/// forbidden answer whether or not the task exists.
///
/// # Errors
///
/// Returns `AccessError::Forbidden` for contributors
pub fn require_task_delete(user: &User) -> Result<(), AccessError> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(AccessError::Forbidden("Only admins can delete tasks"))
    }
}

/// Requires the admin role for the export endpoint
///
/// # Errors
///
/// Returns `AccessError::Forbidden` for contributors
pub fn require_export(user: &User) -> Result<(), AccessError> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(AccessError::Forbidden("Only admins can export tasks"))
    }
}

/// Requires the admin role for reading activity logs
///
/// # Errors
///
/// Returns `AccessError::Forbidden` for contributors
pub fn require_log_access(user: &User) -> Result<(), AccessError> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(AccessError::Forbidden("Only admins can view activity logs"))
    }
}

/// Checks that a loaded task is visible to the requester
///
/// Admins see every task; contributors only the ones assigned to them.
/// Applied after the row is loaded and before it is returned or mutated,
/// so the same check guards detail reads and updates.
///
/// # Errors
///
/// Returns `AccessError::NotVisible` when a contributor asks about a task
/// assigned to someone else
pub fn ensure_task_visible(user: &User, task: &Task) -> Result<(), AccessError> {
    if user.role.can_view_all_tasks() || task.assigned_to == user.id {
        Ok(())
    } else {
        Err(AccessError::NotVisible)
    }
}
