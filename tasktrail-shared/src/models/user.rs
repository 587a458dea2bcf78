/// User model and database operations
///
/// This module provides the User model and the queries the API needs for
/// registration, login, and embedding user details in responses.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'contributor');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(150) NOT NULL UNIQUE,
///     email VARCHAR(254) NOT NULL DEFAULT '',
///     password_hash VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'contributor',
///     first_name VARCHAR(150) NOT NULL DEFAULT '',
///     last_name VARCHAR(150) NOT NULL DEFAULT '',
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Roles
///
/// - **admin**: Sees and manages every project and task, may archive tasks,
///   export data, and read activity logs
/// - **contributor**: Sees only tasks assigned to them and may change only a
///   task's status
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
/// let user = User::create(&pool, CreateUser {
///     username: "john_doe".to_string(),
///     email: "john@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: UserRole::Contributor,
///     first_name: "John".to_string(),
///     last_name: "Doe".to_string(),
/// }).await?;
///
/// let found = User::find_by_username(&pool, "john_doe").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Account roles for authorization decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full visibility and control over all projects, tasks, and logs
    Admin,

    /// Sees assigned tasks only and may update only their status
    Contributor,
}

impl UserRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Contributor => "contributor",
        }
    }

    /// Admins bypass assignment-based visibility entirely
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Can see every task regardless of assignment
    pub fn can_view_all_tasks(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Can edit every task field, not just status
    pub fn can_edit_all_fields(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext. Disabled
/// accounts keep their rows but fail both login and token validation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Login name, unique across all users
    pub username: String,

    /// Email address, may be empty and is not required to be unique
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Role driving every authorization decision
    pub role: UserRole,

    /// Given name, may be empty
    pub first_name: String,

    /// Family name, may be empty
    pub last_name: String,

    /// Disabled accounts cannot log in and their tokens stop working
    pub is_active: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Login name (must be unique)
    pub username: String,

    /// Email address (empty string when not provided)
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password!)
    pub password_hash: String,

    /// Role to assign
    pub role: UserRole,

    /// Given name (empty string when not provided)
    pub first_name: String,

    /// Family name (empty string when not provided)
    pub last_name: String,
}

/// Public view of a user, safe to embed in API responses
///
/// Never carries the password hash or the is_active flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        user.clone().into()
    }
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `data` - User creation data
    ///
    /// # Returns
    ///
    /// The newly created user with generated ID and timestamps
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Username already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, email, password_hash, role, first_name, last_name,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.role)
        .bind(data.first_name)
        .bind(data.last_name)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `id` - User ID to search for
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, first_name, last_name,
                   is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username
    ///
    /// Used by login. Username comparison is exact; uniqueness is enforced
    /// by the database.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `username` - Login name to search for
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, first_name, last_name,
                   is_active, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Loads several users at once by ID
    ///
    /// Used when embedding owners, assignees, and log actors in responses;
    /// one round trip instead of one query per row. Missing IDs are simply
    /// absent from the result.
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `ids` - User IDs to load (duplicates are fine)
    ///
    /// # Returns
    ///
    /// The users that exist, in no particular order
    ///
    /// # Errors
    ///
    /// Returns an error if database connection fails
    pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, first_name, last_name,
                   is_active, created_at, updated_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}
