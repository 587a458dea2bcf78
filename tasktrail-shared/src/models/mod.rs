/// Database models for TaskTrail
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts with admin/contributor roles
/// - `project`: Project containers owned by a user
/// - `task`: Tasks within a project, assigned to a user
/// - `activity_log`: One pre-update snapshot per task
///
/// # Example
///
/// ```no_run
/// use tasktrail_shared::models::user::{User, CreateUser, UserRole};
/// use tasktrail_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     username: "john_doe".to_string(),
///     email: "john@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: UserRole::Contributor,
///     first_name: "John".to_string(),
///     last_name: "Doe".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod activity_log;
pub mod project;
pub mod task;
pub mod user;

/// Escapes LIKE/ILIKE metacharacters in a user-supplied search term
///
/// Without this, a search for "50%" would match every row. Backslash is
/// escaped first so the other escapes stay literal.
pub(crate) fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
