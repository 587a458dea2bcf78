/// Task endpoints
///
/// Task visibility is role-scoped: admins see every non-deleted task,
/// contributors only the ones assigned to them. Updates go through an
/// explicit role dispatcher that picks between two payload shapes, and
/// every update or archive snapshots the prior state into the activity
/// log first.
///
/// # Endpoints
///
/// - `GET /tasks` - List (role-scoped; status/project/assigned_to/search filters)
/// - `POST /tasks` - Create (admin)
/// - `GET /tasks/:id` - Detail (role-scoped)
/// - `PUT/PATCH /tasks/:id` - Update (field set depends on role)
/// - `DELETE /tasks/:id` - Soft-delete (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tasktrail_shared::{
    audit::capture_snapshot,
    auth::{
        authorization::{ensure_task_visible, require_task_create, require_task_delete},
        middleware::CurrentUser,
    },
    models::{
        project::Project,
        task::{CreateTask, Task, TaskDetail, TaskFilter, TaskOrder, TaskStatus, UpdateTask},
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
///
/// `project` and `assigned_to` are ids; both must resolve, and the project
/// must not be archived.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Task description
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,

    /// Initial status (defaults to `todo`)
    pub status: Option<TaskStatus>,

    /// When the task is due
    pub due_date: DateTime<Utc>,

    /// Project the task belongs to
    pub project: Uuid,

    /// User the task is assigned to
    pub assigned_to: Uuid,
}

/// Update payload shape for admins: every mutable field
#[derive(Debug, Deserialize, Validate)]
pub struct AdminTaskUpdate {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    pub due_date: Option<DateTime<Utc>>,

    pub assigned_to: Option<Uuid>,
}

/// Update payload shape for contributors: status only
///
/// Serde drops unknown fields by default, which is exactly the stripping
/// behavior the contributor path needs: a body carrying `title` simply
/// loses it, with no error.
#[derive(Debug, Deserialize)]
pub struct ContributorTaskUpdate {
    pub status: Option<TaskStatus>,
}

/// Task list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct TaskListParams {
    /// Exact status match: `todo`, `in_progress` or `done`
    pub status: Option<String>,

    /// Only tasks in this project
    pub project: Option<String>,

    /// Only tasks assigned to this user
    pub assigned_to: Option<String>,

    /// Case-insensitive substring match on title or description
    pub search: Option<String>,

    /// One of `created_at`, `due_date`, `status`, each with optional `-`
    pub ordering: Option<String>,
}

/// The list scope for a requester: admins see everything
fn visible_scope(user: &User) -> Option<Uuid> {
    if user.role.can_view_all_tasks() {
        None
    } else {
        Some(user.id)
    }
}

/// Parses a uuid-valued query parameter
pub(crate) fn parse_uuid_param(raw: Option<&str>, field: &str) -> Result<Option<Uuid>, ApiError> {
    raw.map(|s| Uuid::parse_str(s).map_err(|_| ApiError::validation(field, "Invalid id")))
        .transpose()
}

/// Parses a status-valued query parameter
pub(crate) fn parse_status_param(
    raw: Option<&str>,
    field: &str,
) -> Result<Option<TaskStatus>, ApiError> {
    raw.map(|s| {
        TaskStatus::parse(s).ok_or_else(|| ApiError::validation(field, "Invalid status value"))
    })
    .transpose()
}

/// Selects the update shape by the requester's role
///
/// Admins may touch every mutable field. Contributors get the status-only
/// shape; any other field in the body is dropped, not rejected.
fn update_for_role(user: &User, body: serde_json::Value) -> Result<UpdateTask, ApiError> {
    if user.role.can_edit_all_fields() {
        let shape: AdminTaskUpdate = serde_json::from_value(body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid payload: {}", e)))?;
        shape.validate()?;

        Ok(UpdateTask {
            title: shape.title,
            description: shape.description,
            status: shape.status,
            due_date: shape.due_date,
            assigned_to: shape.assigned_to,
        })
    } else {
        let shape: ContributorTaskUpdate = serde_json::from_value(body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid payload: {}", e)))?;

        Ok(UpdateTask {
            status: shape.status,
            ..UpdateTask::default()
        })
    }
}

/// List tasks
///
/// Admins get every non-deleted task; contributors only the tasks assigned
/// to them. Unknown `ordering` values fall back to newest-created first.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(params): Query<TaskListParams>,
) -> ApiResult<Json<Vec<TaskDetail>>> {
    let filter = TaskFilter {
        status: parse_status_param(params.status.as_deref(), "status")?,
        project: parse_uuid_param(params.project.as_deref(), "project")?,
        assigned_to: parse_uuid_param(params.assigned_to.as_deref(), "assigned_to")?,
        search: params.search,
    };
    let order = TaskOrder::parse(params.ordering.as_deref());

    let tasks = Task::list(&state.db, visible_scope(&current.user), &filter, order).await?;
    let details = TaskDetail::load_many(&state.db, tasks).await?;

    Ok(Json(details))
}

/// Create a task (admin only)
///
/// # Errors
///
/// - `400 Bad Request`: validation failed, or `project`/`assigned_to` does
///   not resolve to a live row
/// - `403 Forbidden`: requester is not an admin
pub async fn create_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskDetail>)> {
    require_task_create(&current.user)?;
    req.validate()?;

    let project = Project::find_by_id(&state.db, req.project)
        .await?
        .ok_or_else(|| ApiError::validation("project", "Project not found"))?;

    let assignee = User::find_by_id(&state.db, req.assigned_to)
        .await?
        .ok_or_else(|| ApiError::validation("assigned_to", "Assigned user not found"))?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or(TaskStatus::Todo),
            due_date: req.due_date,
            project_id: project.id,
            assigned_to: assignee.id,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, project_id = %project.id, "task created");

    let detail = TaskDetail::load(&state.db, task).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Task detail (role-scoped)
///
/// # Errors
///
/// - `404 Not Found`: no such task, it is soft-deleted, or it is assigned
///   to someone else and the requester is a contributor
pub async fn get_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskDetail>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    ensure_task_visible(&current.user, &task)?;

    let detail = TaskDetail::load(&state.db, task).await?;
    Ok(Json(detail))
}

/// Update a task
///
/// PUT and PATCH behave identically. The accepted field set depends on the
/// requester's role; see [`update_for_role`]. The prior state is recorded
/// in the activity log before the update is persisted, on every call, even
/// when no field changes.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<Json<TaskDetail>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    ensure_task_visible(&current.user, &task)?;

    let update = update_for_role(&current.user, body)?;

    if let Some(assigned_to) = update.assigned_to {
        User::find_by_id(&state.db, assigned_to)
            .await?
            .ok_or_else(|| ApiError::validation("assigned_to", "Assigned user not found"))?;
    }

    // Snapshot the prior state before the mutation lands
    capture_snapshot(&state.db, id).await?;

    let task = Task::update(&state.db, id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let detail = TaskDetail::load(&state.db, task).await?;
    Ok(Json(detail))
}

/// Soft-delete a task (admin only)
///
/// The role gate comes before the lookup: a contributor probing a
/// nonexistent id still sees 403, not 404. Archiving is an update to the
/// row, so the prior state is captured here too. Deleting an
/// already-archived task is a no-op that still returns 204.
///
/// # Errors
///
/// - `403 Forbidden`: requester is not an admin
/// - `404 Not Found`: the id never existed
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_task_delete(&current.user)?;

    let task = Task::find_by_id_any(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if !task.is_deleted {
        capture_snapshot(&state.db, id).await?;
        Task::archive(&state.db, id).await?;
        tracing::info!(task_id = %id, "task archived");
    }

    Ok(StatusCode::NO_CONTENT)
}
