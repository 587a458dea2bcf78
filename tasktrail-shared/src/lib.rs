//! # TaskTrail Shared Library
//!
//! This crate contains shared types, utilities, and business logic used across
//! the TaskTrail API server and its supporting binaries.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication and authorization utilities
//! - `db`: Connection pool and migration runner
//! - `audit`: Pre-update snapshot capture for tasks
//! - `export`: Bucketing logic for the task export document

pub mod audit;
pub mod auth;
pub mod db;
pub mod export;
pub mod models;

/// Current version of the TaskTrail shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
