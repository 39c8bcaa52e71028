/// Drag-and-drop interaction
///
/// Pure state machine for moving a card between columns. It performs no I/O:
/// [`DragReducer::end`] hands back a [`DropAction`] for the controller to
/// carry out.
///
/// # States
///
/// ```text
/// Idle ──start──> Dragging ──over(column)──> OverColumn
///   ^                │  ^                        │
///   └──end/cancel────┘  └──over(other target)────┘
/// ```
///
/// Drop targets are named `column-<status>`. Anything else, including a task
/// id, names no column.

use taskboard_shared::models::task::{TaskStatus, UpdateTask};
use uuid::Uuid;

use crate::state::TaskCollection;

const COLUMN_PREFIX: &str = "column-";

/// A place a card can be dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Column(TaskStatus),
}

impl DropTarget {
    /// Resolves a target identifier, `None` if it is not a column
    pub fn parse(id: &str) -> Option<Self> {
        id.strip_prefix(COLUMN_PREFIX)?
            .parse()
            .ok()
            .map(DropTarget::Column)
    }

    /// Identifier used for a column target
    pub fn column_id(status: TaskStatus) -> String {
        format!("{}{}", COLUMN_PREFIX, status)
    }

    fn status(self) -> TaskStatus {
        match self {
            DropTarget::Column(status) => status,
        }
    }
}

/// Drag state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,

    /// A card is held; `status` is its column as last seen
    Dragging { task_id: Uuid, status: TaskStatus },

    /// The held card is over a column other than its own
    OverColumn {
        task_id: Uuid,
        status: TaskStatus,
        target: TaskStatus,
    },
}

/// Mutation produced by a drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropAction {
    pub task_id: Uuid,
    pub changes: UpdateTask,
}

/// Drag gesture reducer
#[derive(Debug, Clone, Default)]
pub struct DragReducer {
    state: DragState,
}

impl DragReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Picks up a card
    ///
    /// Unknown ids leave the reducer idle.
    pub fn start(&mut self, task_id: Uuid, tasks: &TaskCollection) {
        self.state = match tasks.get(task_id) {
            Some(task) => DragState::Dragging {
                task_id,
                status: task.status,
            },
            None => {
                tracing::debug!(task_id = %task_id, "Drag started on unknown task");
                DragState::Idle
            }
        };
    }

    /// Moves the held card over `target`
    ///
    /// Returns the column the card would land in when it differs from the
    /// card's current one in `tasks`, for a local preview only.
    pub fn over(&mut self, target: Option<&str>, tasks: &TaskCollection) -> Option<TaskStatus> {
        let (task_id, _) = self.held()?;
        let status = match tasks.get(task_id) {
            Some(task) => task.status,
            None => {
                self.state = DragState::Idle;
                return None;
            }
        };

        let preview = target
            .and_then(DropTarget::parse)
            .map(DropTarget::status)
            .filter(|&target| target != status);

        self.state = match preview {
            Some(target) => DragState::OverColumn {
                task_id,
                status,
                target,
            },
            None => DragState::Dragging { task_id, status },
        };

        preview
    }

    /// Drops the held card
    ///
    /// Yields a status update only when `target` is a column other than the
    /// one the card is in according to `tasks` at drop time. The reducer
    /// returns to idle either way.
    pub fn end(&mut self, target: Option<&str>, tasks: &TaskCollection) -> Option<DropAction> {
        let (task_id, _) = self.held()?;
        self.state = DragState::Idle;

        let current = tasks.get(task_id)?.status;
        let target = target.and_then(DropTarget::parse)?.status();
        if target == current {
            return None;
        }

        Some(DropAction {
            task_id,
            changes: UpdateTask {
                status: Some(target),
                ..Default::default()
            },
        })
    }

    /// Abandons the drag
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    fn held(&self) -> Option<(Uuid, TaskStatus)> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { task_id, status } | DragState::OverColumn { task_id, status, .. } => {
                Some((task_id, status))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use taskboard_shared::models::task::Task;

    fn board(status: TaskStatus) -> (TaskCollection, Uuid) {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: "Write spec".to_string(),
            status,
            position: 0,
            user_id: None,
            created_at: now,
            updated_at: now,
        };
        let id = task.id;
        (TaskCollection::from_tasks(vec![task]), id)
    }

    #[test]
    fn test_parse_targets() {
        assert_eq!(DropTarget::parse("column-doing"), Some(DropTarget::Column(TaskStatus::Doing)));
        assert_eq!(DropTarget::parse("column-archived"), None);
        assert_eq!(DropTarget::parse("550e8400-e29b-41d4-a716-446655440000"), None);
        assert_eq!(DropTarget::column_id(TaskStatus::Done), "column-done");
    }

    #[test]
    fn test_start_unknown_task_stays_idle() {
        let (tasks, _) = board(TaskStatus::Todo);
        let mut drag = DragReducer::new();

        drag.start(Uuid::new_v4(), &tasks);
        assert_eq!(drag.state(), DragState::Idle);
        assert_eq!(drag.end(Some("column-done"), &tasks), None);
    }

    #[test]
    fn test_drop_on_other_column_updates_status() {
        let (tasks, id) = board(TaskStatus::Todo);
        let mut drag = DragReducer::new();

        drag.start(id, &tasks);
        assert_eq!(drag.over(Some("column-doing"), &tasks), Some(TaskStatus::Doing));
        assert_eq!(
            drag.state(),
            DragState::OverColumn { task_id: id, status: TaskStatus::Todo, target: TaskStatus::Doing }
        );

        let action = drag.end(Some("column-doing"), &tasks).unwrap();
        assert_eq!(action.task_id, id);
        assert_eq!(action.changes.status, Some(TaskStatus::Doing));
        assert!(action.changes.title.is_none());
        assert!(action.changes.position.is_none());
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn test_over_same_column_has_no_preview() {
        let (tasks, id) = board(TaskStatus::Todo);
        let mut drag = DragReducer::new();
        drag.start(id, &tasks);

        drag.over(Some("column-done"), &tasks);
        assert_eq!(drag.over(Some("column-todo"), &tasks), None);
        assert_eq!(drag.state(), DragState::Dragging { task_id: id, status: TaskStatus::Todo });
    }

    #[test]
    fn test_drops_without_mutation() {
        let (tasks, id) = board(TaskStatus::Doing);
        let mut drag = DragReducer::new();

        drag.start(id, &tasks);
        assert_eq!(drag.end(Some("column-doing"), &tasks), None);

        drag.start(id, &tasks);
        assert_eq!(drag.end(None, &tasks), None);

        drag.start(id, &tasks);
        assert_eq!(drag.end(Some(id.to_string().as_str()), &tasks), None);

        drag.start(id, &tasks);
        drag.over(Some("column-done"), &tasks);
        drag.cancel();
        assert_eq!(drag.state(), DragState::Idle);
        assert_eq!(drag.end(Some("column-done"), &tasks), None);
    }

    #[test]
    fn test_drop_uses_status_at_drop_time() {
        let (mut tasks, id) = board(TaskStatus::Todo);
        let mut drag = DragReducer::new();
        drag.start(id, &tasks);

        let mut moved = tasks.get(id).unwrap().clone();
        moved.status = TaskStatus::Done;
        tasks.resync(vec![moved]);

        let action = drag.end(Some("column-todo"), &tasks).unwrap();
        assert_eq!(action.changes.status, Some(TaskStatus::Todo));
    }

    #[test]
    fn test_drop_onto_column_task_already_reached() {
        let (mut tasks, id) = board(TaskStatus::Todo);
        let mut drag = DragReducer::new();
        drag.start(id, &tasks);

        let mut moved = tasks.get(id).unwrap().clone();
        moved.status = TaskStatus::Doing;
        tasks.resync(vec![moved]);

        assert_eq!(drag.over(Some("column-doing"), &tasks), None);
        assert_eq!(drag.end(Some("column-doing"), &tasks), None);
    }

    #[test]
    fn test_drop_after_task_removed() {
        let (mut tasks, id) = board(TaskStatus::Todo);
        let mut drag = DragReducer::new();
        drag.start(id, &tasks);

        tasks.resync(Vec::new());
        assert_eq!(drag.end(Some("column-done"), &tasks), None);
        assert_eq!(drag.state(), DragState::Idle);
    }
}
