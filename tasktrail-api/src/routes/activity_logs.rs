/// Activity log endpoints
///
/// Read-only view over the single-slot task snapshots. Each task carries
/// at most one log row holding its state immediately before the latest
/// mutation; this endpoint lists those rows with the same filter and
/// ordering conventions as the task list. Admin only.
///
/// # Endpoints
///
/// - `GET /activity-logs` - List snapshots (admin; project/task_status/previous_status/search filters)

use crate::{
    app::AppState,
    error::ApiResult,
    routes::tasks::{parse_status_param, parse_uuid_param},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use tasktrail_shared::{
    auth::{authorization::require_log_access, middleware::CurrentUser},
    models::activity_log::{ActivityLog, ActivityLogDetail, LogFilter, LogOrder},
};

/// Activity log list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct LogListParams {
    /// Only logs whose task belongs to this project
    pub project: Option<String>,

    /// Only logs whose task currently has this status
    pub task_status: Option<String>,

    /// Only logs that snapshotted this previous status
    pub previous_status: Option<String>,

    /// Case-insensitive substring match on the task's title or description
    pub search: Option<String>,

    /// `updated_at` for oldest first; anything else is newest first
    pub ordering: Option<String>,
}

/// List activity logs (admin only)
///
/// Filters compose with AND. `previous_status` matches the snapshot
/// column verbatim and is not validated against the status enum, so
/// probing for values that never occur simply returns an empty list.
pub async fn list_activity_logs(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<LogListParams>,
) -> ApiResult<Json<Vec<ActivityLogDetail>>> {
    require_log_access(&current.user)?;

    let filter = LogFilter {
        project: parse_uuid_param(params.project.as_deref(), "project")?,
        task_status: parse_status_param(params.task_status.as_deref(), "task_status")?,
        previous_status: params.previous_status,
        search: params.search,
    };
    let order = LogOrder::parse(params.ordering.as_deref());

    let logs = ActivityLog::list(&state.db, &filter, order).await?;
    let details = ActivityLogDetail::load_many(&state.db, logs).await?;

    Ok(Json(details))
}
