//! # Taskboard Shared Library
//!
//! Types and business logic shared by the taskboard API server and client.
//!
//! ## Module Organization
//!
//! - `models`: task record and mutation types
//! - `validation`: payload contracts for create/update/reposition
//! - `store`: the `TaskStore` trait with PostgreSQL and in-memory backends
//! - `auth`: session tokens, cookie access and the identity boundary
//! - `db`: connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod store;
pub mod validation;

/// Current version of the taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
