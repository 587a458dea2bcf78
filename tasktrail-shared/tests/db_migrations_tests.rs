/// Integration tests for database migrations
///
/// These tests require a running PostgreSQL database and skip themselves
/// when `TASKTRAIL_TEST_DATABASE_URL` is not set. Tests that need a clean
/// slate create and drop their own scratch databases (derived names) so
/// they never disturb the shared test database other suites point at; the
/// connecting role therefore needs CREATEDB.
///
/// Run with: cargo test --test db_migrations_tests

use std::env;

use tasktrail_shared::db::migrations::{
    drop_database, ensure_database_exists, get_migration_status, run_migrations,
};
use tasktrail_shared::db::pool::{close_pool, create_pool, DatabaseConfig};

/// Returns the test database URL, or None (with a note) when unconfigured
fn test_database_url() -> Option<String> {
    match env::var("TASKTRAIL_TEST_DATABASE_URL") {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: TASKTRAIL_TEST_DATABASE_URL is not set");
            None
        }
    }
}

/// Appends a suffix to the database name so destructive tests get their own
/// database, leaving any query string intact
fn scratch_database_url(base: &str, suffix: &str) -> String {
    match base.split_once('?') {
        Some((head, query)) => format!("{}_{}?{}", head, suffix, query),
        None => format!("{}_{}", base, suffix),
    }
}

#[tokio::test]
async fn test_run_migrations_and_status() {
    let Some(url) = test_database_url() else {
        return;
    };

    ensure_database_exists(&url)
        .await
        .expect("Failed to ensure database exists");

    let config = DatabaseConfig {
        url,
        ..Default::default()
    };
    let pool = create_pool(config).await.expect("Failed to create pool");

    run_migrations(&pool).await.expect("Migrations failed");

    let status = get_migration_status(&pool)
        .await
        .expect("Failed to get migration status");
    assert!(status.applied_migrations > 0, "No migrations were applied");
    assert!(status.latest_version.is_some(), "Latest version should be set");
    assert!(status.is_up_to_date);

    close_pool(pool).await;
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let Some(url) = test_database_url() else {
        return;
    };

    ensure_database_exists(&url)
        .await
        .expect("Failed to ensure database exists");

    let config = DatabaseConfig {
        url,
        ..Default::default()
    };
    let pool = create_pool(config).await.expect("Failed to create pool");

    run_migrations(&pool).await.expect("First migration run failed");
    let status_1 = get_migration_status(&pool).await.expect("Failed to get status");

    run_migrations(&pool).await.expect("Second migration run failed");
    let status_2 = get_migration_status(&pool).await.expect("Failed to get status");

    assert_eq!(
        status_1.applied_migrations, status_2.applied_migrations,
        "Migrations should be idempotent"
    );

    close_pool(pool).await;
}

#[tokio::test]
async fn test_fresh_database_reports_no_migrations() {
    let Some(base_url) = test_database_url() else {
        return;
    };
    let url = scratch_database_url(&base_url, "scratch_fresh");

    drop_database(&url).await.ok();
    ensure_database_exists(&url)
        .await
        .expect("Failed to create scratch database");

    let config = DatabaseConfig {
        url: url.clone(),
        ..Default::default()
    };
    let pool = create_pool(config).await.expect("Failed to create pool");

    let status = get_migration_status(&pool)
        .await
        .expect("Failed to get migration status");
    assert_eq!(status.applied_migrations, 0);
    assert!(status.latest_version.is_none());
    assert!(!status.is_up_to_date);

    close_pool(pool).await;
    drop_database(&url).await.ok();
}

#[tokio::test]
async fn test_migrations_create_schema() {
    let Some(base_url) = test_database_url() else {
        return;
    };
    let url = scratch_database_url(&base_url, "scratch_schema");

    drop_database(&url).await.ok();
    ensure_database_exists(&url)
        .await
        .expect("Failed to create scratch database");

    let config = DatabaseConfig {
        url: url.clone(),
        ..Default::default()
    };
    let pool = create_pool(config).await.expect("Failed to create pool");

    run_migrations(&pool).await.expect("Migrations failed");

    for table_name in ["users", "projects", "tasks", "activity_logs"] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT FROM information_schema.tables
                WHERE table_schema = 'public'
                AND table_name = $1
            )",
        )
        .bind(table_name)
        .fetch_one(&pool)
        .await
        .unwrap_or_else(|e| panic!("Failed to check for table {}: {}", table_name, e));

        assert!(exists, "Table '{}' should exist after migrations", table_name);
    }

    for enum_name in ["user_role", "task_status"] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT FROM pg_type
                WHERE typname = $1
            )",
        )
        .bind(enum_name)
        .fetch_one(&pool)
        .await
        .unwrap_or_else(|e| panic!("Failed to check for enum {}: {}", enum_name, e));

        assert!(exists, "Enum '{}' should exist after migrations", enum_name);
    }

    close_pool(pool).await;
    drop_database(&url).await.ok();
}

#[tokio::test]
async fn test_drop_database() {
    let Some(base_url) = test_database_url() else {
        return;
    };
    let url = scratch_database_url(&base_url, "scratch_drop");

    ensure_database_exists(&url)
        .await
        .expect("Failed to create scratch database");

    drop_database(&url).await.expect("Failed to drop database");

    // Connecting to the dropped database must now fail
    let config = DatabaseConfig {
        url,
        connect_timeout_seconds: 2,
        ..Default::default()
    };
    let result = create_pool(config).await;
    assert!(result.is_err(), "Database should not exist after dropping");
}
