/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user creation with both roles
/// - JWT token generation
/// - Project and task fixtures
///
/// Integration tests need a real PostgreSQL instance. Set
/// `TASKTRAIL_TEST_DATABASE_URL` to point at one; when it is unset every
/// test becomes a silent no-op so `cargo test` stays green on machines
/// without a database.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tasktrail_api::app::{build_router, AppState};
use tasktrail_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, RegistrationConfig};
use tasktrail_shared::auth::jwt::issue_token_pair;
use tasktrail_shared::db::migrations::run_migrations;
use tasktrail_shared::models::project::{CreateProject, Project};
use tasktrail_shared::models::task::{CreateTask, Task, TaskStatus};
use tasktrail_shared::models::user::{CreateUser, User, UserRole};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_ADMIN_KEY: &str = "integration-test-admin-key";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub admin: User,
    pub admin_token: String,
    pub contributor: User,
    pub contributor_token: String,
}

impl TestContext {
    /// Creates a new test context, or None when no test database is configured
    pub async fn new() -> Option<Self> {
        let url = match std::env::var("TASKTRAIL_TEST_DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("TASKTRAIL_TEST_DATABASE_URL not set, skipping integration test");
                return None;
            }
        };

        let db = PgPool::connect(&url)
            .await
            .expect("failed to connect to test database");
        run_migrations(&db).await.expect("migrations failed");

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
            registration: RegistrationConfig {
                admin_key: TEST_ADMIN_KEY.to_string(),
            },
        };

        // Password hash is a placeholder; these users authenticate with
        // minted tokens, not logins. Login tests register their own users.
        let admin = create_user(&db, UserRole::Admin).await;
        let contributor = create_user(&db, UserRole::Contributor).await;

        let (admin_token, _) =
            issue_token_pair(admin.id, TEST_JWT_SECRET).expect("token issuance failed");
        let (contributor_token, _) =
            issue_token_pair(contributor.id, TEST_JWT_SECRET).expect("token issuance failed");

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Some(TestContext {
            db,
            app,
            admin,
            admin_token,
            contributor,
            contributor_token,
        })
    }

    /// Authorization header value for the admin user
    pub fn admin_auth(&self) -> String {
        format!("Bearer {}", self.admin_token)
    }

    /// Authorization header value for the contributor user
    pub fn contributor_auth(&self) -> String {
        format!("Bearer {}", self.contributor_token)
    }

    /// Cleans up test data
    ///
    /// Deleting the context's users cascades through owned projects, their
    /// tasks and the activity logs.
    pub async fn cleanup(&self) {
        sqlx::query("DELETE FROM users WHERE id = $1 OR id = $2")
            .bind(self.admin.id)
            .bind(self.contributor.id)
            .execute(&self.db)
            .await
            .expect("cleanup failed");
    }

    /// Removes a user created inside a test, e.g. via /register
    pub async fn delete_user(&self, username: &str) {
        sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.db)
            .await
            .expect("cleanup failed");
    }
}

/// Generates a unique name so parallel tests never collide
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

async fn create_user(db: &PgPool, role: UserRole) -> User {
    User::create(
        db,
        CreateUser {
            username: unique("user"),
            email: String::new(),
            password_hash: "test_hash".to_string(),
            role,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        },
    )
    .await
    .expect("failed to create test user")
}

/// Helper to create a test project owned by the admin
pub async fn create_test_project(ctx: &TestContext, title: &str) -> Project {
    Project::create(
        &ctx.db,
        CreateProject {
            title: title.to_string(),
            description: "integration test project".to_string(),
            owner_id: ctx.admin.id,
        },
    )
    .await
    .expect("failed to create test project")
}

/// Helper to create a test task
pub async fn create_test_task(
    ctx: &TestContext,
    project_id: Uuid,
    assigned_to: Uuid,
    status: TaskStatus,
    due_in: Duration,
) -> Task {
    Task::create(
        &ctx.db,
        CreateTask {
            title: unique("task"),
            description: "integration test task".to_string(),
            status,
            due_date: Utc::now() + due_in,
            project_id,
            assigned_to,
        },
    )
    .await
    .expect("failed to create test task")
}
