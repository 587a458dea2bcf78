/// Task export endpoint
///
/// Produces a downloadable JSON document bucketing non-deleted tasks into
/// due-soon, overdue and recently-completed groups, stamped with the
/// export time. Admin only.
///
/// # Endpoints
///
/// - `GET /tasks/export` - Download the bucketed export (admin)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Extension,
};
use chrono::Utc;
use tasktrail_shared::{
    auth::{authorization::require_export, middleware::CurrentUser},
    export::{export_filename, ExportDocument},
};

/// Export tasks as a JSON download (admin only)
///
/// The body is pretty-printed and served as an attachment whose filename
/// carries the export timestamp, e.g. `tasks_export_20250118_093000.json`.
///
/// # Errors
///
/// - `403 Forbidden`: requester is not an admin
pub async fn export_tasks(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Response> {
    require_export(&current.user)?;

    let now = Utc::now();
    let document = ExportDocument::build(&state.db, now).await?;
    let body = serde_json::to_string_pretty(&document)
        .map_err(|e| crate::error::ApiError::InternalError(e.to_string()))?;

    tracing::info!(
        due_soon = document.due_soon.len(),
        overdue = document.overdue.len(),
        recently_completed = document.recently_completed.len(),
        "tasks exported"
    );

    let disposition = format!("attachment; filename=\"{}\"", export_filename(now));
    let mut response = body.into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response.headers_mut().insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| crate::error::ApiError::InternalError(e.to_string()))?,
    );

    Ok(response)
}
