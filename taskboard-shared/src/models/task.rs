/// Task model
///
/// This module provides the Task record shown on the board. A task lives in
/// exactly one status column and carries a `position` that orders it within
/// that column only.
///
/// # Columns
///
/// ```text
/// todo → doing → done
/// ```
///
/// Any status can move to any other status; the board imposes no transition
/// rules.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     status TEXT NOT NULL DEFAULT 'todo'
///         CHECK (status IN ('todo', 'doing', 'done')),
///     position INTEGER NOT NULL DEFAULT 0 CHECK (position >= 0),
///     user_id UUID,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Wire format
///
/// Tasks serialize with camelCase keys and RFC 3339 timestamps:
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "title": "Write spec",
///   "status": "todo",
///   "position": 0,
///   "userId": "9b2f6c1e-4c1f-4a53-9f0e-2f8a7d1c3b55",
///   "createdAt": "2025-01-04T12:00:00Z",
///   "updatedAt": "2025-01-04T12:00:00Z"
/// }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Maximum title length in characters
pub const TITLE_MAX_LEN: u64 = 200;

/// Board column a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not started
    #[default]
    Todo,

    /// In progress
    Doing,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Column order on the board
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::Doing, TaskStatus::Done];

    /// Converts status to its wire/storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        }
    }

    /// Column heading shown to users
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::Doing => "Doing",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the board statuses
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "doing" => Ok(TaskStatus::Doing),
            "done" => Ok(TaskStatus::Done),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Task record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Task title (1-200 characters)
    pub title: String,

    /// Column the task is in
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,

    /// Order within the status column
    pub position: i32,

    /// Owning user (None for unowned/legacy tasks)
    pub user_id: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Checks whether the task belongs to the given user
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == Some(user_id)
    }
}

/// Input for creating a new task
///
/// Defaults have already been applied by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Task title
    pub title: String,

    /// Initial column
    pub status: TaskStatus,

    /// Initial position in the column
    pub position: i32,

    /// Owner assigned by the server
    pub user_id: Option<Uuid>,
}

/// Partial update for a task
///
/// `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// New column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    /// New position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

impl UpdateTask {
    /// Returns true if no field would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.status.is_none() && self.position.is_none()
    }

    /// Merges the supplied fields into a task
    ///
    /// Does not touch `updated_at`; callers stamp it themselves.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(position) = self.position {
            task.position = position;
        }
    }
}

/// One entry of a bulk reposition batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    /// Task to move
    pub id: Uuid,

    /// Target column
    pub status: TaskStatus,

    /// Target position in that column
    pub position: i32,
}

/// Orders tasks by status name, then position
///
/// Status compares by its wire name, so columns come out as
/// `doing, done, todo`. Ties fall back to creation time and id so the
/// order is total.
pub fn board_order(a: &Task, b: &Task) -> std::cmp::Ordering {
    a.status
        .as_str()
        .cmp(b.status.as_str())
        .then(a.position.cmp(&b.position))
        .then(a.created_at.cmp(&b.created_at))
        .then(a.id.cmp(&b.id))
}
