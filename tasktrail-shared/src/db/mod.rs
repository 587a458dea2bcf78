/// Database utilities and connection management
///
/// This module provides database connection pooling and migration support
/// for the TaskTrail Postgres database.
pub mod migrations;
pub mod pool;

pub use migrations::run_migrations;
pub use pool::{create_pool, DatabaseConfig};
