/// In-memory task store
///
/// Keeps tasks in a `HashMap` behind a tokio `RwLock`. Used by the test
/// suites and by `TASKBOARD_STORE=memory` local runs. Semantics match
/// [`super::postgres::PgTaskStore`], including ordering and batch atomicity.
///
/// A reposition batch checks every id under the write lock before touching
/// any row, so readers (who need the read lock) never see a partial batch.

use super::{StoreError, StoreResult, TaskStore};
use crate::models::task::{board_order, NewTask, PositionUpdate, Task, UpdateTask};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Task store held in process memory
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryTaskStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with tasks (ids kept as given)
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: RwLock::new(tasks.into_iter().map(|t| (t.id, t)).collect()),
        }
    }

    /// Number of stored tasks
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Returns true if no tasks are stored
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list(&self, user_id: Option<Uuid>) -> StoreResult<Vec<Task>> {
        let tasks = self.tasks.read().await;

        let mut result: Vec<Task> = tasks
            .values()
            .filter(|t| user_id.map_or(true, |owner| t.is_owned_by(owner)))
            .cloned()
            .collect();
        result.sort_by(board_order);

        Ok(result)
    }

    async fn get_by_id(&self, id: Uuid, user_id: Option<Uuid>) -> StoreResult<Option<Task>> {
        let tasks = self.tasks.read().await;

        Ok(tasks
            .get(&id)
            .filter(|t| user_id.map_or(true, |owner| t.is_owned_by(owner)))
            .cloned())
    }

    async fn create(&self, data: NewTask) -> StoreResult<Task> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            status: data.status,
            position: data.position,
            user_id: data.user_id,
            created_at: now,
            updated_at: now,
        };

        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, id: Uuid, data: UpdateTask) -> StoreResult<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        data.apply_to(task);
        task.updated_at = Utc::now();

        Ok(task.clone())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Task> {
        self.tasks
            .write()
            .await
            .remove(&id)
            .ok_or(StoreError::NotFound(id))
    }

    async fn bulk_reposition(&self, updates: &[PositionUpdate]) -> StoreResult<()> {
        let mut tasks = self.tasks.write().await;

        if let Some(missing) = updates.iter().find(|u| !tasks.contains_key(&u.id)) {
            return Err(StoreError::NotFound(missing.id));
        }

        let now = Utc::now();
        for update in updates {
            if let Some(task) = tasks.get_mut(&update.id) {
                task.status = update.status;
                task.position = update.position;
                task.updated_at = now;
            }
        }

        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
