/// Database layer for Taskboard
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: embedded schema migrations
///
/// The task store built on top of the pool lives in [`crate::store`].

pub mod migrations;
pub mod pool;
