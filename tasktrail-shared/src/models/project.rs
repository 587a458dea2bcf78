/// Project model and database operations
///
/// Projects group tasks and are owned by a single user. They are never
/// hard-deleted through the API; `archive` flips `is_deleted` and every
/// read path filters on it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasktrail_shared::models::project::{Project, CreateProject, ProjectOrder};
/// use tasktrail_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(owner_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let project = Project::create(&pool, CreateProject {
///     title: "E-commerce Website".to_string(),
///     description: "Storefront rebuild".to_string(),
///     owner_id,
/// }).await?;
///
/// let visible = Project::list(&pool, Some("commerce"), ProjectOrder::default()).await?;
/// assert!(visible.iter().any(|p| p.id == project.id));
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::escape_like;
use crate::models::task::Task;
use crate::models::user::{PublicUser, User};

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID (UUID v4)
    pub id: Uuid,

    /// Project title
    pub title: String,

    /// Free-form description, may be empty
    pub description: String,

    /// Owning user, fixed at creation
    pub owner_id: Uuid,

    /// Soft-delete flag; archived projects vanish from list/detail reads
    pub is_deleted: bool,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Project title
    pub title: String,

    /// Description (empty string when not provided)
    pub description: String,

    /// Owning user
    pub owner_id: Uuid,
}

/// Input for updating a project
///
/// Only non-None fields are written. The owner cannot be reassigned through
/// the update path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// Sort orders accepted by the project list endpoint
///
/// Parsed from the `ordering` query parameter using the leading-minus
/// convention. Anything unrecognized falls back to the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectOrder {
    /// Newest first (the default)
    #[default]
    CreatedAtDesc,
    CreatedAtAsc,
    TitleAsc,
    TitleDesc,
}

impl ProjectOrder {
    /// Parses an `ordering` query value, falling back to the default
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("created_at") => ProjectOrder::CreatedAtAsc,
            Some("-created_at") => ProjectOrder::CreatedAtDesc,
            Some("title") => ProjectOrder::TitleAsc,
            Some("-title") => ProjectOrder::TitleDesc,
            _ => ProjectOrder::default(),
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            ProjectOrder::CreatedAtDesc => "created_at DESC",
            ProjectOrder::CreatedAtAsc => "created_at ASC",
            ProjectOrder::TitleAsc => "title ASC",
            ProjectOrder::TitleDesc => "title DESC",
        }
    }
}

impl Project {
    /// Creates a new project in the database
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `data` - Project creation data
    ///
    /// # Returns
    ///
    /// The newly created project with generated ID and timestamps
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The owner does not exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (title, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, owner_id, is_deleted, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.owner_id)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a live (non-archived) project by ID
    ///
    /// Archived projects are treated as absent, indistinguishable from IDs
    /// that never existed.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `id` - Project ID to search for
    ///
    /// # Returns
    ///
    /// The project if found and not archived, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, description, owner_id, is_deleted, created_at, updated_at
            FROM projects
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID regardless of its archived state
    ///
    /// Only for delete idempotence and for embedding a task's project in
    /// serialized output; normal reads go through [`Project::find_by_id`].
    pub async fn find_by_id_any(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, description, owner_id, is_deleted, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Loads several projects at once by ID, archived ones included
    ///
    /// Used when embedding projects in task responses; a task keeps pointing
    /// at its project even after the project is archived.
    pub async fn find_by_ids_any(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, description, owner_id, is_deleted, created_at, updated_at
            FROM projects
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Updates a project's title and/or description
    ///
    /// Only non-None fields are written. The `updated_at` timestamp is
    /// always refreshed. Archived projects are not updatable.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `id` - ID of project to update
    /// * `data` - Fields to update
    ///
    /// # Returns
    ///
    /// The updated project, or None if it does not exist or is archived
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND is_deleted = FALSE \
             RETURNING id, title, description, owner_id, is_deleted, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }

        let project = q.fetch_optional(pool).await?;

        Ok(project)
    }

    /// Archives a project (soft delete)
    ///
    /// Sets `is_deleted = TRUE`. The row stays in place so existing tasks
    /// and logs keep their references.
    ///
    /// # Returns
    ///
    /// True if a live project was archived, false if it was already
    /// archived or never existed
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn archive(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET is_deleted = TRUE, updated_at = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists live projects, optionally narrowed by a search term
    ///
    /// The search matches title or description, case-insensitively, with
    /// LIKE metacharacters in the term escaped.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `search` - Substring to match against title/description
    /// * `order` - Sort order
    ///
    /// # Returns
    ///
    /// Matching non-archived projects
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        order: ProjectOrder,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            "SELECT id, title, description, owner_id, is_deleted, created_at, updated_at \
             FROM projects WHERE is_deleted = FALSE",
        );

        if search.is_some() {
            query.push_str(" AND (title ILIKE $1 OR description ILIKE $1)");
        }

        query.push_str(&format!(" ORDER BY {}", order.sql()));

        let mut q = sqlx::query_as::<_, Project>(&query);

        if let Some(term) = search {
            q = q.bind(format!("%{}%", escape_like(term)));
        }

        let projects = q.fetch_all(pool).await?;

        Ok(projects)
    }
}

/// Fully-hydrated project for API responses
///
/// Carries the embedded owner and the count of live tasks, matching what
/// the list and detail endpoints return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub owner: PublicUser,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tasks_count: i64,
}

impl ProjectDetail {
    /// Hydrates a single project
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if the owner row is missing, which the owner
    /// foreign key should make impossible
    pub async fn load(pool: &PgPool, project: Project) -> Result<Self, sqlx::Error> {
        let mut details = Self::load_many(pool, vec![project]).await?;
        details.pop().ok_or(sqlx::Error::RowNotFound)
    }

    /// Hydrates a batch of projects preserving their order
    ///
    /// Owners and task counts are fetched with one query each rather than
    /// one per project.
    ///
    /// # Errors
    ///
    /// Returns `RowNotFound` if any owner row is missing
    pub async fn load_many(
        pool: &PgPool,
        projects: Vec<Project>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        if projects.is_empty() {
            return Ok(Vec::new());
        }

        let owner_ids: Vec<Uuid> = projects.iter().map(|p| p.owner_id).collect();
        let project_ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();

        let owners: HashMap<Uuid, User> = User::find_by_ids(pool, &owner_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let counts = Task::count_by_projects(pool, &project_ids).await?;

        let mut details = Vec::with_capacity(projects.len());
        for project in projects {
            let owner = owners
                .get(&project.owner_id)
                .ok_or(sqlx::Error::RowNotFound)?;

            details.push(ProjectDetail {
                id: project.id,
                title: project.title,
                description: project.description,
                owner: owner.into(),
                created_at: project.created_at,
                updated_at: project.updated_at,
                tasks_count: counts.get(&project.id).copied().unwrap_or(0),
            });
        }

        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_order_parse() {
        assert_eq!(
            ProjectOrder::parse(Some("created_at")),
            ProjectOrder::CreatedAtAsc
        );
        assert_eq!(
            ProjectOrder::parse(Some("-created_at")),
            ProjectOrder::CreatedAtDesc
        );
        assert_eq!(ProjectOrder::parse(Some("title")), ProjectOrder::TitleAsc);
        assert_eq!(ProjectOrder::parse(Some("-title")), ProjectOrder::TitleDesc);
    }

    #[test]
    fn test_project_order_unknown_falls_back_to_default() {
        assert_eq!(
            ProjectOrder::parse(Some("due_date")),
            ProjectOrder::CreatedAtDesc
        );
        assert_eq!(ProjectOrder::parse(None), ProjectOrder::CreatedAtDesc);
    }

    #[test]
    fn test_update_project_default_is_noop() {
        let update = UpdateProject::default();
        assert!(update.title.is_none());
        assert!(update.description.is_none());
    }

    // Integration tests for database operations are in the API crate
}
