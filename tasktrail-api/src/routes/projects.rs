/// Project endpoints
///
/// Projects are readable by any authenticated user; every mutation is
/// admin-only. Deletion is a soft delete and the DELETE verb is idempotent.
///
/// # Endpoints
///
/// - `GET /projects` - List non-deleted projects (search, ordering)
/// - `POST /projects` - Create project (admin)
/// - `GET /projects/:id` - Project detail
/// - `PUT/PATCH /projects/:id` - Update title/description (admin)
/// - `DELETE /projects/:id` - Soft-delete (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tasktrail_shared::{
    auth::{authorization::require_project_write, middleware::CurrentUser},
    models::project::{
        CreateProject, Project, ProjectDetail, ProjectOrder, UpdateProject,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Project description
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,
}

/// Update project request
///
/// PUT and PATCH both apply partial updates; absent fields are left alone.
/// Owner and the deletion flag are not reachable from here.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    /// New description
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,
}

/// Project list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListParams {
    /// Case-insensitive substring match on title or description
    pub search: Option<String>,

    /// One of `created_at`, `-created_at`, `title`, `-title`
    pub ordering: Option<String>,
}

/// List projects
///
/// Returns all non-deleted projects, newest first unless `ordering` says
/// otherwise. Unknown `ordering` values fall back to the default.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<ProjectListParams>,
) -> ApiResult<Json<Vec<ProjectDetail>>> {
    let order = ProjectOrder::parse(params.ordering.as_deref());
    let projects = Project::list(&state.db, params.search.as_deref(), order).await?;
    let details = ProjectDetail::load_many(&state.db, projects).await?;

    Ok(Json(details))
}

/// Create a project (admin only)
///
/// The requester becomes the owner.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `403 Forbidden`: requester is not an admin
pub async fn create_project(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectDetail>)> {
    require_project_write(&current.user)?;
    req.validate()?;

    let project = Project::create(
        &state.db,
        CreateProject {
            title: req.title,
            description: req.description,
            owner_id: current.user.id,
        },
    )
    .await?;

    tracing::info!(project_id = %project.id, owner = %current.user.username, "project created");

    let detail = ProjectDetail::load(&state.db, project).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Project detail
///
/// # Errors
///
/// - `404 Not Found`: no such project, or it has been soft-deleted
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectDetail>> {
    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let detail = ProjectDetail::load(&state.db, project).await?;
    Ok(Json(detail))
}

/// Update a project (admin only)
pub async fn update_project(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectDetail>> {
    require_project_write(&current.user)?;
    req.validate()?;

    let project = Project::update(
        &state.db,
        id,
        UpdateProject {
            title: req.title,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let detail = ProjectDetail::load(&state.db, project).await?;
    Ok(Json(detail))
}

/// Soft-delete a project (admin only)
///
/// Archiving an already-archived project is a no-op that still returns 204.
///
/// # Errors
///
/// - `403 Forbidden`: requester is not an admin
/// - `404 Not Found`: the id never existed
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_project_write(&current.user)?;

    let project = Project::find_by_id_any(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    if !project.is_deleted {
        Project::archive(&state.db, id).await?;
        tracing::info!(project_id = %id, "project archived");
    }

    Ok(StatusCode::NO_CONTENT)
}
