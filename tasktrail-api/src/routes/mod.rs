/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh, profile)
/// - `projects`: Project CRUD with soft deletion
/// - `tasks`: Task CRUD with role-scoped visibility and audit capture
/// - `export`: Bucketed task export download
/// - `activity_logs`: Audit log listing

pub mod activity_logs;
pub mod auth;
pub mod export;
pub mod health;
pub mod projects;
pub mod tasks;
