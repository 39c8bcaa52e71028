/// Task persistence
///
/// The [`TaskStore`] trait is the only shared mutable resource of the
/// service. Handlers hold it behind an `Arc<dyn TaskStore>` and never keep
/// task state of their own.
///
/// # Implementations
///
/// - [`postgres::PgTaskStore`]: PostgreSQL via sqlx (production)
/// - [`memory::MemoryTaskStore`]: in-process store for tests and local runs
///
/// # Atomicity
///
/// `create`, `update` and `delete` each touch one row. `bulk_reposition`
/// touches many rows and must be all-or-nothing: a reader running during the
/// batch sees either none of it or all of it, and a batch naming a missing
/// task changes nothing.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::store::{memory::MemoryTaskStore, TaskStore};
/// use taskboard_shared::models::task::{NewTask, TaskStatus};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryTaskStore::new();
/// let owner = Uuid::new_v4();
///
/// let task = store.create(NewTask {
///     title: "Write spec".to_string(),
///     status: TaskStatus::Todo,
///     position: 0,
///     user_id: Some(owner),
/// }).await?;
///
/// let mine = store.list(Some(owner)).await?;
/// assert_eq!(mine[0].id, task.id);
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use crate::models::task::{NewTask, PositionUpdate, Task, UpdateTask};
use async_trait::async_trait;
use uuid::Uuid;

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No task with this id
    #[error("Task not found: {0}")]
    NotFound(Uuid),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored row could not be decoded or the store is otherwise unusable
    #[error("Store error: {0}")]
    Internal(String),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence primitives for tasks
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Lists tasks ordered by status name then position
    ///
    /// `Some(user_id)` restricts the result to that owner.
    async fn list(&self, user_id: Option<Uuid>) -> StoreResult<Vec<Task>>;

    /// Finds one task, optionally scoped to an owner
    async fn get_by_id(&self, id: Uuid, user_id: Option<Uuid>) -> StoreResult<Option<Task>>;

    /// Inserts a task with a fresh id and timestamps
    async fn create(&self, data: NewTask) -> StoreResult<Task>;

    /// Merges the supplied fields and refreshes `updated_at`
    ///
    /// Not owner-scoped. Fails with [`StoreError::NotFound`] if the id is unknown.
    async fn update(&self, id: Uuid, data: UpdateTask) -> StoreResult<Task>;

    /// Removes a task, returning its last state
    ///
    /// Not owner-scoped. Fails with [`StoreError::NotFound`] if the id is unknown.
    async fn delete(&self, id: Uuid) -> StoreResult<Task>;

    /// Applies every status/position change in one transaction
    async fn bulk_reposition(&self, updates: &[PositionUpdate]) -> StoreResult<()>;

    /// Verifies the store is reachable
    async fn health_check(&self) -> StoreResult<()>;
}
