//! Development data seeder
//!
//! Populates the database with a small, deterministic set of sample users,
//! projects and tasks for local development and manual testing. Safe to
//! run more than once: rows that already exist are left alone.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tasktrail-api --bin seed
//! ```

use chrono::{Duration, Utc};
use tasktrail_api::config::Config;
use tasktrail_shared::{
    auth::password::hash_password,
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    },
    models::{
        project::{CreateProject, Project, ProjectOrder},
        task::{CreateTask, Task, TaskFilter, TaskOrder, TaskStatus},
        user::{CreateUser, User, UserRole},
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,tasktrail_shared=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    run_migrations(&pool).await?;

    let admin = ensure_user(
        &pool,
        "admin",
        "admin123",
        "admin@example.com",
        UserRole::Admin,
        "Admin",
        "User",
    )
    .await?;
    let john = ensure_user(
        &pool,
        "john_doe",
        "john123",
        "john@example.com",
        UserRole::Contributor,
        "John",
        "Doe",
    )
    .await?;
    let jane = ensure_user(
        &pool,
        "jane_smith",
        "jane123",
        "jane@example.com",
        UserRole::Contributor,
        "Jane",
        "Smith",
    )
    .await?;

    let ecommerce = ensure_project(
        &pool,
        "E-commerce Website",
        "Building a modern e-commerce platform with a React storefront",
        admin.id,
    )
    .await?;
    let mobile = ensure_project(
        &pool,
        "Mobile App Development",
        "Developing a cross-platform mobile application",
        admin.id,
    )
    .await?;

    let now = Utc::now();

    // Deliberately spans every export bucket: due soon, overdue and
    // recently completed are all represented.
    let samples = [
        SampleTask {
            title: "Setup Authentication System",
            description: "Implement JWT-based authentication for the application",
            status: TaskStatus::InProgress,
            due_date: now + Duration::days(2),
            project_id: ecommerce.id,
            assigned_to: john.id,
        },
        SampleTask {
            title: "Design Database Schema",
            description: "Create comprehensive database schema for the e-commerce platform",
            status: TaskStatus::Done,
            due_date: now - Duration::days(1),
            project_id: ecommerce.id,
            assigned_to: jane.id,
        },
        SampleTask {
            title: "Implement Product Catalog",
            description: "Build product listing and detail pages",
            status: TaskStatus::Todo,
            due_date: now + Duration::days(5),
            project_id: ecommerce.id,
            assigned_to: john.id,
        },
        SampleTask {
            title: "Setup CI/CD Pipeline",
            description: "Configure automated testing and deployment",
            status: TaskStatus::Todo,
            due_date: now - Duration::days(2),
            project_id: ecommerce.id,
            assigned_to: jane.id,
        },
        SampleTask {
            title: "Mobile UI Design",
            description: "Create responsive UI components for mobile app",
            status: TaskStatus::InProgress,
            due_date: now + Duration::hours(30),
            project_id: mobile.id,
            assigned_to: john.id,
        },
        SampleTask {
            title: "API Integration",
            description: "Integrate mobile app with backend APIs",
            status: TaskStatus::Done,
            due_date: now - Duration::hours(12),
            project_id: mobile.id,
            assigned_to: jane.id,
        },
    ];

    for sample in samples {
        ensure_task(&pool, sample).await?;
    }

    println!();
    println!("Sample data created successfully!");
    println!();
    println!("Login credentials:");
    println!("Admin - Username: admin, Password: admin123");
    println!("Contributor 1 - Username: john_doe, Password: john123");
    println!("Contributor 2 - Username: jane_smith, Password: jane123");

    Ok(())
}

struct SampleTask {
    title: &'static str,
    description: &'static str,
    status: TaskStatus,
    due_date: chrono::DateTime<Utc>,
    project_id: uuid::Uuid,
    assigned_to: uuid::Uuid,
}

/// Finds a user by username or creates it
async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    password: &str,
    email: &str,
    role: UserRole,
    first_name: &str,
    last_name: &str,
) -> anyhow::Result<User> {
    if let Some(existing) = User::find_by_username(pool, username).await? {
        return Ok(existing);
    }

    let user = User::create(
        pool,
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            role,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        },
    )
    .await?;
    println!("Created user: {}", username);

    Ok(user)
}

/// Finds a live project by exact title or creates it
async fn ensure_project(
    pool: &sqlx::PgPool,
    title: &str,
    description: &str,
    owner_id: uuid::Uuid,
) -> anyhow::Result<Project> {
    let candidates = Project::list(pool, Some(title), ProjectOrder::default()).await?;
    if let Some(existing) = candidates.into_iter().find(|p| p.title == title) {
        return Ok(existing);
    }

    let project = Project::create(
        pool,
        CreateProject {
            title: title.to_string(),
            description: description.to_string(),
            owner_id,
        },
    )
    .await?;
    println!("Created project: {}", title);

    Ok(project)
}

/// Finds a live task by exact title within its project or creates it
async fn ensure_task(pool: &sqlx::PgPool, sample: SampleTask) -> anyhow::Result<()> {
    let filter = TaskFilter {
        project: Some(sample.project_id),
        search: Some(sample.title.to_string()),
        ..Default::default()
    };
    let candidates = Task::list(pool, None, &filter, TaskOrder::default()).await?;
    if candidates.iter().any(|t| t.title == sample.title) {
        return Ok(());
    }

    Task::create(
        pool,
        CreateTask {
            title: sample.title.to_string(),
            description: sample.description.to_string(),
            status: sample.status,
            due_date: sample.due_date,
            project_id: sample.project_id,
            assigned_to: sample.assigned_to,
        },
    )
    .await?;
    println!("Created task: {}", sample.title);

    Ok(())
}
