/// Local task collection
///
/// The board keeps its own copy of the caller's tasks so changes can be shown
/// before the server confirms them. Three operations move that copy:
///
/// - [`TaskCollection::apply_optimistic`]: a change the user just made
/// - [`TaskCollection::commit`]: the server's answer to a change
/// - [`TaskCollection::resync`]: replace everything with a fresh listing,
///   which is also how a failed change is reverted
///
/// # Example
///
/// ```
/// use taskboard_client::state::{LocalChange, TaskCollection};
/// use taskboard_shared::models::task::{TaskStatus, UpdateTask};
/// # use chrono::Utc;
/// # use taskboard_shared::models::task::Task;
/// # use uuid::Uuid;
/// # let now = Utc::now();
/// # let task = Task { id: Uuid::new_v4(), title: "Write spec".into(), status: TaskStatus::Todo,
/// #     position: 0, user_id: None, created_at: now, updated_at: now };
///
/// let mut tasks = TaskCollection::from_tasks(vec![task.clone()]);
/// tasks.apply_optimistic(LocalChange::Update {
///     id: task.id,
///     changes: UpdateTask { status: Some(TaskStatus::Doing), ..Default::default() },
/// });
///
/// assert_eq!(tasks.get(task.id).unwrap().status, TaskStatus::Doing);
/// ```

use chrono::Utc;
use taskboard_shared::models::task::{PositionUpdate, Task, TaskStatus, UpdateTask};
use uuid::Uuid;

/// A change applied locally before the server confirms it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalChange {
    /// Merge fields into one task
    Update { id: Uuid, changes: UpdateTask },

    /// Move several tasks at once
    Reposition(Vec<PositionUpdate>),
}

/// Server truth for a single task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    /// Newly created task, appended
    Created(Task),

    /// Updated task, replaces the entry with the same id
    Replaced(Task),

    /// Deleted task
    Removed(Uuid),
}

/// One board column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

/// Client-side mirror of the caller's tasks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCollection {
    tasks: Vec<Task>,
}

impl TaskCollection {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection from a server listing
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Applies a local change ahead of the server
    ///
    /// Ids that are not present are skipped. Updated tasks get a local
    /// `updated_at`; the server's value replaces it on commit.
    pub fn apply_optimistic(&mut self, change: LocalChange) {
        match change {
            LocalChange::Update { id, changes } => {
                if let Some(task) = self.get_mut(id) {
                    changes.apply_to(task);
                    task.updated_at = Utc::now();
                }
            }
            LocalChange::Reposition(updates) => {
                for update in updates {
                    if let Some(task) = self.get_mut(update.id) {
                        task.status = update.status;
                        task.position = update.position;
                    }
                }
            }
        }
    }

    /// Folds a server response into the collection
    pub fn commit(&mut self, commit: Commit) {
        match commit {
            Commit::Created(task) => self.tasks.push(task),
            Commit::Replaced(task) => match self.get_mut(task.id) {
                Some(existing) => *existing = task,
                None => {
                    tracing::debug!(task_id = %task.id, "Committed task no longer present locally");
                }
            },
            Commit::Removed(id) => self.tasks.retain(|task| task.id != id),
        }
    }

    /// Replaces the collection with a fresh server listing
    pub fn resync(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn get_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    /// Tasks in the order they were received
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Groups tasks into the board columns
    ///
    /// Columns come out as todo, doing, done, each sorted by position.
    /// Empty columns are included.
    pub fn by_status(&self) -> Vec<Column> {
        TaskStatus::ALL
            .iter()
            .map(|&status| {
                let mut tasks: Vec<Task> = self
                    .tasks
                    .iter()
                    .filter(|task| task.status == status)
                    .cloned()
                    .collect();
                tasks.sort_by_key(|task| task.position);
                Column { status, tasks }
            })
            .collect()
    }
}
