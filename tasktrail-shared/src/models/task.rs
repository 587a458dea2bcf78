/// Task model and database operations
///
/// Tasks belong to a project and are assigned to a user. Like projects they
/// are soft-deleted: `archive` flips `is_deleted` and every ordinary read
/// filters on it. The unfiltered lookups exist solely for snapshot capture
/// and for idempotent deletes.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL,
///     status task_status NOT NULL DEFAULT 'todo',
///     due_date TIMESTAMPTZ NOT NULL,
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     assigned_to UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasktrail_shared::models::task::{Task, CreateTask, TaskStatus, TaskFilter, TaskOrder};
/// use tasktrail_shared::db::pool::{create_pool, DatabaseConfig};
/// use chrono::{Duration, Utc};
/// use uuid::Uuid;
///
/// # async fn example(project_id: Uuid, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     title: "Design database schema".to_string(),
///     description: "Model projects and tasks".to_string(),
///     status: TaskStatus::Todo,
///     due_date: Utc::now() + Duration::days(3),
///     project_id,
///     assigned_to: user_id,
/// }).await?;
///
/// // Contributor view: only tasks assigned to this user
/// let mine = Task::list(&pool, Some(user_id), &TaskFilter::default(), TaskOrder::default()).await?;
/// assert!(mine.iter().any(|t| t.id == task.id));
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::escape_like;
use crate::models::project::{Project, ProjectDetail};
use crate::models::user::{PublicUser, User};

/// Task workflow states
///
/// Stored as a Postgres enum; declaration order doubles as the sort order
/// for `ordering=status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }

    /// Parses the wire form, as used in query parameters
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "todo" => Some(TaskStatus::Todo),
            "in_progress" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    /// Open tasks are the ones the due-date buckets care about
    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Todo | TaskStatus::InProgress)
    }

    /// Whether the task is finished
    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Free-form description, may be empty
    pub description: String,

    /// Workflow state
    pub status: TaskStatus,

    /// When the task is due
    pub due_date: DateTime<Utc>,

    /// Project this task belongs to
    pub project_id: Uuid,

    /// User the task is assigned to
    pub assigned_to: Uuid,

    /// Soft-delete flag; archived tasks vanish from list/detail reads
    pub is_deleted: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Task title
    pub title: String,

    /// Description (empty string when not provided)
    pub description: String,

    /// Initial workflow state
    pub status: TaskStatus,

    /// When the task is due
    pub due_date: DateTime<Utc>,

    /// Project this task belongs to
    pub project_id: Uuid,

    /// User the task is assigned to
    pub assigned_to: Uuid,
}

/// Input for updating a task
///
/// Only non-None fields are written. The HTTP layer decides which fields a
/// requester may set; by the time an UpdateTask reaches the database, role
/// filtering has already happened.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New workflow state
    pub status: Option<TaskStatus>,

    /// New due date
    pub due_date: Option<DateTime<Utc>>,

    /// New assignee
    pub assigned_to: Option<Uuid>,
}

impl UpdateTask {
    /// True when no field would be written
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
            && self.assigned_to.is_none()
    }
}

/// Exact-match filters accepted by the task list endpoint
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Only tasks in this state
    pub status: Option<TaskStatus>,

    /// Only tasks in this project
    pub project: Option<Uuid>,

    /// Only tasks assigned to this user
    pub assigned_to: Option<Uuid>,

    /// Substring match against title or description
    pub search: Option<String>,
}

/// Sort orders accepted by the task list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskOrder {
    /// Newest first (the default)
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
    DueDateAsc,
    DueDateDesc,
    StatusAsc,
    StatusDesc,
}

impl TaskOrder {
    /// Parses an `ordering` query value, falling back to the default
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("created_at") => TaskOrder::CreatedAtAsc,
            Some("-created_at") => TaskOrder::CreatedAtDesc,
            Some("due_date") => TaskOrder::DueDateAsc,
            Some("-due_date") => TaskOrder::DueDateDesc,
            Some("status") => TaskOrder::StatusAsc,
            Some("-status") => TaskOrder::StatusDesc,
            _ => TaskOrder::default(),
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            TaskOrder::CreatedAtDesc => "created_at DESC",
            TaskOrder::CreatedAtAsc => "created_at ASC",
            TaskOrder::DueDateAsc => "due_date ASC",
            TaskOrder::DueDateDesc => "due_date DESC",
            TaskOrder::StatusAsc => "status ASC",
            TaskOrder::StatusDesc => "status DESC",
        }
    }
}

impl Task {
    /// Creates a new task in the database
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `data` - Task creation data
    ///
    /// # Returns
    ///
    /// The newly created task with generated ID and timestamps
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The project or assignee does not exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status, due_date, project_id, assigned_to)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, status, due_date, project_id, assigned_to,
                      is_deleted, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.due_date)
        .bind(data.project_id)
        .bind(data.assigned_to)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a live (non-archived) task by ID
    ///
    /// Archived tasks are treated as absent, indistinguishable from IDs
    /// that never existed.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `id` - Task ID to search for
    ///
    /// # Returns
    ///
    /// The task if found and not archived, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, due_date, project_id, assigned_to,
                   is_deleted, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID regardless of its archived state
    ///
    /// Only for snapshot capture and delete idempotence; normal reads go
    /// through [`Task::find_by_id`].
    pub async fn find_by_id_any(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, due_date, project_id, assigned_to,
                   is_deleted, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Loads several tasks at once by ID, archived ones included
    ///
    /// Used when embedding tasks in activity-log responses; a log keeps
    /// pointing at its task even after the task is archived.
    pub async fn find_by_ids_any(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, due_date, project_id, assigned_to,
                   is_deleted, created_at, updated_at
            FROM tasks
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a task
    ///
    /// Only non-None fields are written. The `updated_at` timestamp is
    /// always refreshed, even when the update changes nothing else, which
    /// is what keeps `recently_completed` in the export honest. Archived
    /// tasks are not updatable.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `id` - ID of task to update
    /// * `data` - Fields to update
    ///
    /// # Returns
    ///
    /// The updated task, or None if it does not exist or is archived
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The new assignee does not exist (foreign key violation)
    /// - Database connection fails
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if data.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND is_deleted = FALSE \
             RETURNING id, title, description, status, due_date, project_id, assigned_to, \
             is_deleted, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(assigned_to) = data.assigned_to {
            q = q.bind(assigned_to);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Archives a task (soft delete)
    ///
    /// Sets `is_deleted = TRUE`. The row and its activity log stay in place.
    ///
    /// # Returns
    ///
    /// True if a live task was archived, false if it was already archived
    /// or never existed
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn archive(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists live tasks with role scoping, filters, and ordering
    ///
    /// `visible_to` implements contributor visibility: when Some, only
    /// tasks assigned to that user are returned, on top of whatever other
    /// filters apply. Admin callers pass None.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `visible_to` - Restrict to tasks assigned to this user, if set
    /// * `filter` - Exact-match and search filters
    /// * `order` - Sort order
    ///
    /// # Returns
    ///
    /// Matching non-archived tasks
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list(
        pool: &PgPool,
        visible_to: Option<Uuid>,
        filter: &TaskFilter,
        order: TaskOrder,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            "SELECT id, title, description, status, due_date, project_id, assigned_to, \
             is_deleted, created_at, updated_at \
             FROM tasks WHERE is_deleted = FALSE",
        );
        let mut bind_count = 0;

        if visible_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND assigned_to = ${}", bind_count));
        }
        if filter.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND status = ${}", bind_count));
        }
        if filter.project.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND project_id = ${}", bind_count));
        }
        if filter.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND assigned_to = ${}", bind_count));
        }
        if filter.search.is_some() {
            bind_count += 1;
            query.push_str(&format!(
                " AND (title ILIKE ${0} OR description ILIKE ${0})",
                bind_count
            ));
        }

        query.push_str(&format!(" ORDER BY {}", order.sql()));

        let mut q = sqlx::query_as::<_, Task>(&query);

        if let Some(user_id) = visible_to {
            q = q.bind(user_id);
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(project_id) = filter.project {
            q = q.bind(project_id);
        }
        if let Some(assigned_to) = filter.assigned_to {
            q = q.bind(assigned_to);
        }
        if let Some(ref term) = filter.search {
            q = q.bind(format!("%{}%", escape_like(term)));
        }

        let tasks = q.fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Counts live tasks per project
    ///
    /// Feeds the `tasks_count` field on serialized projects. Projects with
    /// no live tasks are absent from the map.
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn count_by_projects(
        pool: &PgPool,
        project_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, i64>, sqlx::Error> {
        if project_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT project_id, COUNT(*)
            FROM tasks
            WHERE project_id = ANY($1) AND is_deleted = FALSE
            GROUP BY project_id
            "#,
        )
        .bind(project_ids)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}

/// Fully-hydrated task for API responses
///
/// Embeds the complete project (owner and task count included) and the
/// assignee's public fields. The embedded project is looked up without the
/// archived filter: a task keeps reporting its project even after that
/// project is archived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,
    pub project: ProjectDetail,
    pub assigned_to: PublicUser,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskDetail {
    /// Hydrates a single task
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if the project or assignee row is missing,
    /// which the foreign keys should make impossible
    pub async fn load(pool: &PgPool, task: Task) -> Result<Self, sqlx::Error> {
        let mut details = Self::load_many(pool, vec![task]).await?;
        details.pop().ok_or(sqlx::Error::RowNotFound)
    }

    /// Hydrates a batch of tasks preserving their order
    ///
    /// Projects (with their own owners and counts) and assignees are each
    /// fetched in a constant number of queries.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if any referenced project or assignee row is
    /// missing
    pub async fn load_many(pool: &PgPool, tasks: Vec<Task>) -> Result<Vec<Self>, sqlx::Error> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }

        let mut project_ids: Vec<Uuid> = tasks.iter().map(|t| t.project_id).collect();
        project_ids.sort_unstable();
        project_ids.dedup();

        let assignee_ids: Vec<Uuid> = tasks.iter().map(|t| t.assigned_to).collect();

        let projects = Project::find_by_ids_any(pool, &project_ids).await?;
        let project_details: HashMap<Uuid, ProjectDetail> =
            ProjectDetail::load_many(pool, projects)
                .await?
                .into_iter()
                .map(|d| (d.id, d))
                .collect();

        let assignees: HashMap<Uuid, User> = User::find_by_ids(pool, &assignee_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let mut details = Vec::with_capacity(tasks.len());
        for task in tasks {
            let project = project_details
                .get(&task.project_id)
                .ok_or(sqlx::Error::RowNotFound)?;
            let assignee = assignees
                .get(&task.assigned_to)
                .ok_or(sqlx::Error::RowNotFound)?;

            details.push(TaskDetail {
                id: task.id,
                title: task.title,
                description: task.description,
                status: task.status,
                due_date: task.due_date,
                project: project.clone(),
                assigned_to: assignee.into(),
                created_at: task.created_at,
                updated_at: task.updated_at,
            });
        }

        Ok(details)
    }
}
