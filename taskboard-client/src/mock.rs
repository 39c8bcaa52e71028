/// In-process task API for testing and demos
///
/// `MockTaskApi` answers like the real server, backed by the shared
/// in-memory store, and lets callers script failures and latency:
///
/// - [`MockTaskApi::fail_next`] makes the next N calls of one operation fail
///   with a 500
/// - [`MockTaskApi::with_latency`] delays every call, which lets tests
///   interleave work with an in-flight request
///
/// Every call is counted per [`Operation`].
///
/// # Example
///
/// ```
/// use taskboard_client::api::{CreateTaskRequest, TaskApi};
/// use taskboard_client::mock::{MockTaskApi, Operation};
/// use taskboard_shared::models::task::TaskStatus;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = MockTaskApi::new();
/// api.fail_next(Operation::Create, 1);
///
/// let request = CreateTaskRequest { title: "Write spec".into(), status: TaskStatus::Todo, position: 0 };
/// assert!(api.create(&request).await.is_err());
/// assert!(api.create(&request).await.is_ok());
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use taskboard_shared::models::task::{NewTask, PositionUpdate, Task, UpdateTask};
use taskboard_shared::store::{memory::MemoryTaskStore, StoreError, TaskStore};
use uuid::Uuid;

use crate::api::{ClientError, CreateTaskRequest, TaskApi};
use crate::config::PublicConfig;

/// Task API operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
    Reposition,
    PublicConfig,
}

#[derive(Debug, Default)]
struct Script {
    calls: HashMap<Operation, usize>,
    failures: HashMap<Operation, usize>,
}

/// Scripted in-process [`TaskApi`]
#[derive(Debug)]
pub struct MockTaskApi {
    owner: Uuid,
    store: MemoryTaskStore,
    public_config: tokio::sync::RwLock<Option<PublicConfig>>,
    script: Mutex<Script>,
    latency: Option<Duration>,
}

impl Default for MockTaskApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTaskApi {
    /// Creates an empty board owned by a fresh user
    pub fn new() -> Self {
        Self {
            owner: Uuid::new_v4(),
            store: MemoryTaskStore::new(),
            public_config: tokio::sync::RwLock::new(None),
            script: Mutex::new(Script::default()),
            latency: None,
        }
    }

    /// Starts from existing server-side tasks
    pub fn with_tasks(mut self, tasks: impl IntoIterator<Item = Task>) -> Self {
        self.store = MemoryTaskStore::with_tasks(tasks);
        self
    }

    /// Serves this public config
    pub fn with_public_config(self, config: PublicConfig) -> Self {
        Self {
            public_config: tokio::sync::RwLock::new(Some(config)),
            ..self
        }
    }

    /// Delays every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Changes the served public config
    pub async fn set_public_config(&self, config: PublicConfig) {
        *self.public_config.write().await = Some(config);
    }

    /// User that owns tasks created through this API
    pub fn owner(&self) -> Uuid {
        self.owner
    }

    /// Fails the next `times` calls of `operation`
    pub fn fail_next(&self, operation: Operation, times: usize) {
        *self.script().failures.entry(operation).or_default() += times;
    }

    /// Number of calls made for `operation`
    pub fn call_count(&self, operation: Operation) -> usize {
        self.script().calls.get(&operation).copied().unwrap_or(0)
    }

    /// Server-side tasks, in board order
    pub async fn server_tasks(&self) -> Vec<Task> {
        self.store.list(None).await.unwrap_or_default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Counts the call, waits out latency, then applies scripted failures
    async fn enter(&self, operation: Operation) -> Result<(), ClientError> {
        let fail = {
            let mut script = self.script();
            *script.calls.entry(operation).or_default() += 1;

            match script.failures.get_mut(&operation) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            }
        };

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if fail {
            return Err(ClientError::Status {
                status: 500,
                message: format!("Injected {:?} failure", operation),
            });
        }

        Ok(())
    }
}

fn to_client_error(err: StoreError) -> ClientError {
    match err {
        StoreError::NotFound(_) => ClientError::Status {
            status: 404,
            message: "Task not found".to_string(),
        },
        other => ClientError::Status {
            status: 500,
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl TaskApi for MockTaskApi {
    async fn list(&self) -> Result<Vec<Task>, ClientError> {
        self.enter(Operation::List).await?;
        self.store.list(Some(self.owner)).await.map_err(to_client_error)
    }

    async fn create(&self, request: &CreateTaskRequest) -> Result<Task, ClientError> {
        self.enter(Operation::Create).await?;
        self.store
            .create(NewTask {
                title: request.title.clone(),
                status: request.status,
                position: request.position,
                user_id: Some(self.owner),
            })
            .await
            .map_err(to_client_error)
    }

    async fn update(&self, id: Uuid, changes: &UpdateTask) -> Result<Task, ClientError> {
        self.enter(Operation::Update).await?;
        self.store
            .get_by_id(id, Some(self.owner))
            .await
            .map_err(to_client_error)?
            .ok_or_else(|| to_client_error(StoreError::NotFound(id)))?;
        self.store.update(id, changes.clone()).await.map_err(to_client_error)
    }

    async fn delete(&self, id: Uuid) -> Result<Task, ClientError> {
        self.enter(Operation::Delete).await?;
        self.store
            .get_by_id(id, Some(self.owner))
            .await
            .map_err(to_client_error)?
            .ok_or_else(|| to_client_error(StoreError::NotFound(id)))?;
        self.store.delete(id).await.map_err(to_client_error)
    }

    async fn reposition(&self, updates: &[PositionUpdate]) -> Result<(), ClientError> {
        self.enter(Operation::Reposition).await?;
        self.store.bulk_reposition(updates).await.map_err(to_client_error)
    }

    async fn public_config(&self) -> Result<PublicConfig, ClientError> {
        self.enter(Operation::PublicConfig).await?;
        self.public_config
            .read()
            .await
            .clone()
            .ok_or_else(|| ClientError::Status {
                status: 500,
                message: "Auth configuration is not set".to_string(),
            })
    }
}
