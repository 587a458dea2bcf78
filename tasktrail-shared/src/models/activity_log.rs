/// Activity log model and database operations
///
/// Each task owns at most one activity log row: a snapshot of the task's
/// assignee, status, and due date as they were immediately before the most
/// recent update. The row is overwritten on every update, so it answers
/// "what was this task before the last change" rather than keeping a full
/// history.
///
/// Rows are written exclusively by the snapshot capture in [`crate::audit`];
/// the API only reads them.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE activity_logs (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL UNIQUE REFERENCES tasks(id) ON DELETE CASCADE,
///     previous_assignee UUID REFERENCES users(id) ON DELETE SET NULL,
///     previous_status VARCHAR(20) NOT NULL DEFAULT '',
///     previous_due_date TIMESTAMPTZ,
///     updated_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::escape_like;
use crate::models::task::{Task, TaskDetail, TaskStatus};
use crate::models::user::{PublicUser, User};

/// Activity log model: one pre-update snapshot per task
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityLog {
    /// Unique log ID (UUID v4)
    pub id: Uuid,

    /// The task this snapshot belongs to (one log per task)
    pub task_id: Uuid,

    /// Assignee before the last update, nulled if that user is removed
    pub previous_assignee: Option<Uuid>,

    /// Status string before the last update
    pub previous_status: String,

    /// Due date before the last update
    pub previous_due_date: Option<DateTime<Utc>>,

    /// Reserved for the acting user; the capture path never fills it
    pub updated_by: Option<Uuid>,

    /// When the snapshot was last overwritten
    pub updated_at: DateTime<Utc>,
}

/// Filters accepted by the activity log list endpoint
///
/// `task_status` matches the task's current status while `previous_status`
/// matches the snapshot, so "everything that just left in_progress" is
/// `previous_status=in_progress`.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    /// Only logs whose task belongs to this project
    pub project: Option<Uuid>,

    /// Only logs whose task currently has this status
    pub task_status: Option<TaskStatus>,

    /// Only logs snapshotting this previous status
    pub previous_status: Option<String>,

    /// Substring match against the task's title or description
    pub search: Option<String>,
}

/// Sort orders accepted by the activity log list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOrder {
    /// Most recently overwritten first (the default)
    #[default]
    UpdatedAtDesc,
    UpdatedAtAsc,
}

impl LogOrder {
    /// Parses an `ordering` query value, falling back to the default
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("updated_at") => LogOrder::UpdatedAtAsc,
            _ => LogOrder::UpdatedAtDesc,
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            LogOrder::UpdatedAtDesc => "al.updated_at DESC",
            LogOrder::UpdatedAtAsc => "al.updated_at ASC",
        }
    }
}

impl ActivityLog {
    /// Writes the snapshot for a task, creating or overwriting its log row
    ///
    /// Takes the pre-update version of the task; its current assignee,
    /// status, and due date become the "previous" values. `updated_by` is
    /// deliberately left untouched.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `task` - The task row as persisted before the pending change
    ///
    /// # Returns
    ///
    /// The log row as stored
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn upsert_snapshot(pool: &PgPool, task: &Task) -> Result<Self, sqlx::Error> {
        let log = sqlx::query_as::<_, ActivityLog>(
            r#"
            INSERT INTO activity_logs (task_id, previous_assignee, previous_status, previous_due_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (task_id) DO UPDATE
            SET previous_assignee = EXCLUDED.previous_assignee,
                previous_status = EXCLUDED.previous_status,
                previous_due_date = EXCLUDED.previous_due_date,
                updated_at = NOW()
            RETURNING id, task_id, previous_assignee, previous_status, previous_due_date,
                      updated_by, updated_at
            "#,
        )
        .bind(task.id)
        .bind(task.assigned_to)
        .bind(task.status.as_str())
        .bind(task.due_date)
        .fetch_one(pool)
        .await?;

        Ok(log)
    }

    /// Finds the log row for a task
    ///
    /// # Returns
    ///
    /// The log if the task has ever been updated, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_task(pool: &PgPool, task_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let log = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT id, task_id, previous_assignee, previous_status, previous_due_date,
                   updated_by, updated_at
            FROM activity_logs
            WHERE task_id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(pool)
        .await?;

        Ok(log)
    }

    /// Lists activity logs with filters and ordering
    ///
    /// Joins tasks for the project/status/search filters. Archived tasks'
    /// logs are listed like any other; the log survives the task's soft
    /// delete on purpose.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `filter` - Task-side and snapshot-side filters
    /// * `order` - Sort order
    ///
    /// # Returns
    ///
    /// Matching logs
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list(
        pool: &PgPool,
        filter: &LogFilter,
        order: LogOrder,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            "SELECT al.id, al.task_id, al.previous_assignee, al.previous_status, \
             al.previous_due_date, al.updated_by, al.updated_at \
             FROM activity_logs al \
             JOIN tasks t ON t.id = al.task_id",
        );
        let mut bind_count = 0;
        let mut conjunction = " WHERE";

        if filter.project.is_some() {
            bind_count += 1;
            query.push_str(&format!("{} t.project_id = ${}", conjunction, bind_count));
            conjunction = " AND";
        }
        if filter.task_status.is_some() {
            bind_count += 1;
            query.push_str(&format!("{} t.status = ${}", conjunction, bind_count));
            conjunction = " AND";
        }
        if filter.previous_status.is_some() {
            bind_count += 1;
            query.push_str(&format!(
                "{} al.previous_status = ${}",
                conjunction, bind_count
            ));
            conjunction = " AND";
        }
        if filter.search.is_some() {
            bind_count += 1;
            query.push_str(&format!(
                "{} (t.title ILIKE ${1} OR t.description ILIKE ${1})",
                conjunction, bind_count
            ));
        }

        query.push_str(&format!(" ORDER BY {}", order.sql()));

        let mut q = sqlx::query_as::<_, ActivityLog>(&query);

        if let Some(project_id) = filter.project {
            q = q.bind(project_id);
        }
        if let Some(status) = filter.task_status {
            q = q.bind(status);
        }
        if let Some(ref previous_status) = filter.previous_status {
            q = q.bind(previous_status.clone());
        }
        if let Some(ref term) = filter.search {
            q = q.bind(format!("%{}%", escape_like(term)));
        }

        let logs = q.fetch_all(pool).await?;

        Ok(logs)
    }
}

/// Fully-hydrated activity log for API responses
///
/// Embeds the complete task (nested project and assignee included) plus
/// the snapshot's previous assignee and, when ever populated, the actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogDetail {
    pub id: Uuid,
    pub task: TaskDetail,
    pub previous_assignee: Option<PublicUser>,
    pub previous_status: String,
    pub previous_due_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<PublicUser>,
}

impl ActivityLogDetail {
    /// Hydrates a batch of logs preserving their order
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if a referenced task row is missing, which the
    /// task foreign key should make impossible
    pub async fn load_many(
        pool: &PgPool,
        logs: Vec<ActivityLog>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        if logs.is_empty() {
            return Ok(Vec::new());
        }

        let task_ids: Vec<Uuid> = logs.iter().map(|l| l.task_id).collect();
        let tasks = Task::find_by_ids_any(pool, &task_ids).await?;
        let task_details: HashMap<Uuid, TaskDetail> = TaskDetail::load_many(pool, tasks)
            .await?
            .into_iter()
            .map(|d| (d.id, d))
            .collect();

        let user_ids: Vec<Uuid> = logs
            .iter()
            .flat_map(|l| [l.previous_assignee, l.updated_by])
            .flatten()
            .collect();
        let users: HashMap<Uuid, User> = User::find_by_ids(pool, &user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let mut details = Vec::with_capacity(logs.len());
        for log in logs {
            let task = task_details
                .get(&log.task_id)
                .ok_or(sqlx::Error::RowNotFound)?;

            details.push(ActivityLogDetail {
                id: log.id,
                task: task.clone(),
                previous_assignee: log
                    .previous_assignee
                    .and_then(|id| users.get(&id))
                    .map(PublicUser::from),
                previous_status: log.previous_status,
                previous_due_date: log.previous_due_date,
                updated_at: log.updated_at,
                updated_by: log.updated_by.and_then(|id| users.get(&id)).map(PublicUser::from),
            });
        }

        Ok(details)
    }
}
