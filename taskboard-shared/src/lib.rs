//! # Taskboard Shared Library
//!
//! Domain types, authentication primitives and persistence used by the
//! Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Users, teams, members, projects and tasks with their queries
//! - `auth`: Password hashing, token service, request auth and role checks
//! - `store`: The `Store` trait with PostgreSQL and in-memory backends
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
