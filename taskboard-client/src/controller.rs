/// Task board controller
///
/// Owns the board's [`TaskCollection`] and mediates every change through a
/// [`TaskApi`].
///
/// # Update strategy
///
/// | Operation    | Local change         | On success             |
/// |--------------|----------------------|------------------------|
/// | `create`     | after the server     | append server record   |
/// | `update`     | before the server    | replace with server    |
/// | `delete`     | after the server     | remove                 |
/// | `reposition` | before the server    | keep local             |
///
/// Any failure records a message in the error slot and then re-fetches the
/// whole list, which reverts optimistic changes. That corrective fetch does
/// not touch the loading flag or clear the error.
///
/// # Lifetime
///
/// [`TaskBoardController::unmount`] ends the controller's lifetime. Listings
/// that complete afterwards are dropped instead of being written into the
/// collection.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskboard_client::controller::TaskBoardController;
/// use taskboard_client::mock::MockTaskApi;
/// use taskboard_shared::models::task::TaskStatus;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let controller = TaskBoardController::new(Arc::new(MockTaskApi::new()));
/// controller.load().await;
///
/// controller.create("Write spec", TaskStatus::Todo).await?;
/// assert_eq!(controller.snapshot().await.tasks.len(), 1);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use taskboard_shared::models::task::{PositionUpdate, Task, TaskStatus, UpdateTask};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::api::{ClientError, CreateTaskRequest, TaskApi};
use crate::state::{Column, Commit, LocalChange, TaskCollection};

#[derive(Debug)]
struct BoardState {
    tasks: TaskCollection,
    loading: bool,
    error: Option<String>,
}

/// Point-in-time view of the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub tasks: Vec<Task>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Client-side task board
pub struct TaskBoardController {
    api: Arc<dyn TaskApi>,
    state: Mutex<BoardState>,
    mounted: CancellationToken,
}

impl TaskBoardController {
    /// Creates a controller in the loading state
    pub fn new(api: Arc<dyn TaskApi>) -> Self {
        Self {
            api,
            state: Mutex::new(BoardState {
                tasks: TaskCollection::new(),
                loading: true,
                error: None,
            }),
            mounted: CancellationToken::new(),
        }
    }

    /// Initial load
    pub async fn load(&self) {
        self.fetch_tasks(true).await;
    }

    /// Re-fetches the full list
    ///
    /// With `show_loading`, the loading flag is raised for the duration of
    /// the fetch and a previous error is cleared first.
    pub async fn fetch_tasks(&self, show_loading: bool) {
        if show_loading {
            let mut state = self.state.lock().await;
            state.loading = true;
            state.error = None;
        }

        let result = self.api.list().await;

        if self.mounted.is_cancelled() {
            tracing::debug!("Board unmounted, discarding task list");
            return;
        }

        let mut state = self.state.lock().await;
        match result {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "Fetched tasks");
                state.tasks.resync(tasks);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch tasks");
                state.error = Some(format!("Failed to fetch tasks: {}", e));
            }
        }
        if show_loading {
            state.loading = false;
        }
    }

    /// Creates a task at position 0 of `status`
    pub async fn create(&self, title: &str, status: TaskStatus) -> Result<Task, ClientError> {
        let request = CreateTaskRequest {
            title: title.to_string(),
            status,
            position: 0,
        };

        match self.api.create(&request).await {
            Ok(task) => {
                tracing::info!(task_id = %task.id, status = %task.status, "Task created");
                self.state.lock().await.tasks.commit(Commit::Created(task.clone()));
                Ok(task)
            }
            Err(e) => Err(self.recover("create task", e).await),
        }
    }

    /// Updates a task, showing the change immediately
    pub async fn update(&self, id: Uuid, changes: UpdateTask) -> Result<Task, ClientError> {
        self.state.lock().await.tasks.apply_optimistic(LocalChange::Update {
            id,
            changes: changes.clone(),
        });

        match self.api.update(id, &changes).await {
            Ok(task) => {
                tracing::info!(task_id = %id, "Task updated");
                self.state.lock().await.tasks.commit(Commit::Replaced(task.clone()));
                Ok(task)
            }
            Err(e) => Err(self.recover("update task", e).await),
        }
    }

    /// Deletes a task once the server confirms
    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        match self.api.delete(id).await {
            Ok(_) => {
                tracing::info!(task_id = %id, "Task deleted");
                self.state.lock().await.tasks.commit(Commit::Removed(id));
                Ok(())
            }
            Err(e) => Err(self.recover("delete task", e).await),
        }
    }

    /// Moves several tasks, showing the moves immediately
    pub async fn reposition(&self, updates: Vec<PositionUpdate>) -> Result<(), ClientError> {
        self.state
            .lock()
            .await
            .tasks
            .apply_optimistic(LocalChange::Reposition(updates.clone()));

        match self.api.reposition(&updates).await {
            Ok(()) => {
                tracing::info!(count = updates.len(), "Tasks repositioned");
                Ok(())
            }
            Err(e) => Err(self.recover("update task positions", e).await),
        }
    }

    /// Records the failure and resyncs with the server
    async fn recover(&self, action: &str, err: ClientError) -> ClientError {
        tracing::error!(error = %err, "Failed to {}", action);
        self.state.lock().await.error = Some(format!("Failed to {}: {}", action, err));
        self.fetch_tasks(false).await;
        err
    }

    /// Ends the controller's lifetime
    pub fn unmount(&self) {
        self.mounted.cancel();
    }

    pub fn is_mounted(&self) -> bool {
        !self.mounted.is_cancelled()
    }

    pub async fn snapshot(&self) -> BoardSnapshot {
        let state = self.state.lock().await;
        BoardSnapshot {
            tasks: state.tasks.tasks().to_vec(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    /// Current tasks grouped into board columns
    pub async fn columns(&self) -> Vec<Column> {
        self.state.lock().await.tasks.by_status()
    }

    /// Runs `f` against the current collection
    pub async fn with_tasks<R>(&self, f: impl FnOnce(&TaskCollection) -> R) -> R {
        f(&self.state.lock().await.tasks)
    }
}
