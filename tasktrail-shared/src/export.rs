/// Bucketing logic for the task export document
///
/// The export endpoint delivers a JSON document with three buckets, each
/// computed against a single "now" so the whole document is internally
/// consistent:
///
/// - `due_soon`: not deleted, open (todo or in_progress), due within the
///   next 48 hours, inclusive at both ends
/// - `overdue`: not deleted, open, due date strictly before now
/// - `recently_completed`: not deleted, done, updated within the last 24
///   hours, inclusive
///
/// The buckets are independent filters over the same task set, not a
/// partition; a task belongs to every bucket whose predicate it satisfies.
/// With these exact predicates membership happens to be exclusive (the due
/// buckets cover disjoint date ranges and require open status, the
/// completed bucket requires done), but nothing downstream may rely on
/// that.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::models::task::{Task, TaskDetail, TaskFilter, TaskOrder};

/// Width of the `due_soon` window
pub fn due_soon_window() -> Duration {
    Duration::hours(48)
}

/// Width of the `recently_completed` window
pub fn recently_completed_window() -> Duration {
    Duration::hours(24)
}

/// Raw bucket assignment over task rows
#[derive(Debug, Clone, Default)]
pub struct ExportBuckets {
    pub due_soon: Vec<Task>,
    pub overdue: Vec<Task>,
    pub recently_completed: Vec<Task>,
}

/// The serialized export document
///
/// Tasks are fully hydrated: nested project (with owner and task count)
/// and assignee, same shape as the task endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub exported_at: DateTime<Utc>,
    pub due_soon: Vec<TaskDetail>,
    pub overdue: Vec<TaskDetail>,
    pub recently_completed: Vec<TaskDetail>,
}

/// Sorts live tasks into the three export buckets
///
/// Pure function over already-loaded rows; `now` is passed in so the
/// export handler evaluates every predicate against the same instant.
pub fn bucketize(tasks: &[Task], now: DateTime<Utc>) -> ExportBuckets {
    let mut buckets = ExportBuckets::default();
    let due_soon_end = now + due_soon_window();
    let completed_start = now - recently_completed_window();

    for task in tasks {
        if task.is_deleted {
            continue;
        }

        if task.status.is_open() && task.due_date >= now && task.due_date <= due_soon_end {
            buckets.due_soon.push(task.clone());
        }

        if task.status.is_open() && task.due_date < now {
            buckets.overdue.push(task.clone());
        }

        if task.status.is_done() && task.updated_at >= completed_start {
            buckets.recently_completed.push(task.clone());
        }
    }

    buckets
}

/// File name carried in the Content-Disposition header of the export
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("tasks_export_{}.json", now.format("%Y%m%d_%H%M%S"))
}

impl ExportDocument {
    /// Builds the complete export document against `now`
    ///
    /// Loads every live task, buckets them, and hydrates each task once
    /// even when buckets could overlap.
    ///
    /// # Errors
    ///
    /// Returns an error if database access fails
    pub async fn build(pool: &PgPool, now: DateTime<Utc>) -> Result<Self, sqlx::Error> {
        let tasks = Task::list(pool, None, &TaskFilter::default(), TaskOrder::default()).await?;
        let buckets = bucketize(&tasks, now);

        let details: std::collections::HashMap<uuid::Uuid, TaskDetail> =
            TaskDetail::load_many(pool, tasks)
                .await?
                .into_iter()
                .map(|d| (d.id, d))
                .collect();

        let hydrate = |bucket: Vec<Task>| -> Vec<TaskDetail> {
            bucket
                .into_iter()
                .filter_map(|t| details.get(&t.id).cloned())
                .collect()
        };

        Ok(ExportDocument {
            exported_at: now,
            due_soon: hydrate(buckets.due_soon),
            overdue: hydrate(buckets.overdue),
            recently_completed: hydrate(buckets.recently_completed),
        })
    }
}
