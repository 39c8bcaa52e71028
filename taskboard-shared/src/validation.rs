/// Request payload validation
///
/// Every task mutation arrives as one of the payloads below. Each payload
/// either normalizes into a store input (with defaults applied) or fails with
/// a [`ValidationFailure`] listing field-level issues. Nothing that fails
/// here is ever handed to a store.
///
/// # Rules
///
/// | Payload | Field | Rule |
/// |---|---|---|
/// | create | `title` | required, 1-200 characters |
/// | create | `status` | optional, `todo`/`doing`/`done`, default `todo` |
/// | create | `position` | optional, integer >= 0, default 0 |
/// | update | any | optional, same per-field rules, no defaults |
/// | create, update | any | may be omitted, never `null` |
/// | reposition | `updates[i]` | `id` task id, `status` in set, `position` >= 0 |
///
/// Reposition items are checked one by one. Duplicate ids, gaps, or
/// colliding positions inside a batch are accepted as given.
///
/// # Example
///
/// ```
/// use taskboard_shared::validation::CreateTaskPayload;
/// use taskboard_shared::models::task::TaskStatus;
///
/// let payload: CreateTaskPayload = serde_json::from_str(r#"{"title": "Write spec"}"#).unwrap();
/// let input = payload.normalize().unwrap();
/// assert_eq!(input.status, TaskStatus::Todo);
/// assert_eq!(input.position, 0);
/// ```

use crate::models::task::{NewTask, PositionUpdate, TaskStatus, UpdateTask};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

const STATUS_MESSAGE: &str = "Status must be one of: todo, doing, done";
const POSITION_MESSAGE: &str = "Position must be a non-negative integer";
const NULL_MESSAGE: &str = "Value must not be null";

/// A single field-level problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Field path (e.g. `title`, `updates[2].status`)
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validation failed with one or more field issues
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed: {} issues", .issues.len())]
pub struct ValidationFailure {
    /// Issues sorted by field path
    pub issues: Vec<FieldIssue>,
}

impl ValidationFailure {
    /// Failure with a single issue
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue::new(field, message)],
        }
    }

    fn from_issues(mut issues: Vec<FieldIssue>) -> Result<(), Self> {
        if issues.is_empty() {
            return Ok(());
        }
        issues.sort_by(|a, b| a.field.cmp(&b.field));
        Err(Self { issues })
    }
}

impl From<ValidationErrors> for ValidationFailure {
    fn from(errors: ValidationErrors) -> Self {
        let mut issues = Vec::new();
        collect_issues("", &errors, &mut issues);
        issues.sort_by(|a, b| a.field.cmp(&b.field));
        Self { issues }
    }
}

/// Flattens validator's nested error tree into dotted/indexed paths
fn collect_issues(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldIssue>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", error.code));
                    out.push(FieldIssue::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_issues(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_issues(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

/// Runs validator rules, returning the issues instead of failing fast
fn rule_issues<T: Validate>(payload: &T) -> Vec<FieldIssue> {
    match payload.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => ValidationFailure::from(errors).issues,
    }
}

fn parse_status(field: &str, raw: &str, issues: &mut Vec<FieldIssue>) -> Option<TaskStatus> {
    match raw.parse::<TaskStatus>() {
        Ok(status) => Some(status),
        Err(_) => {
            issues.push(FieldIssue::new(field, STATUS_MESSAGE));
            None
        }
    }
}

/// Reads a field that may be absent, `null`, or a value
///
/// Absent stays `None` (via `#[serde(default)]`); `null` becomes `Some(None)`.
fn explicit<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Unwraps an [`explicit`] field, reporting `null` as an issue
fn non_null<T>(field: &str, value: Option<Option<T>>, issues: &mut Vec<FieldIssue>) -> Option<T> {
    match value {
        Some(None) => {
            issues.push(FieldIssue::new(field, NULL_MESSAGE));
            None
        }
        Some(value) => value,
        None => None,
    }
}

/// Appends rule issues for fields not already reported as `null`
fn merge_rule_issues(issues: &mut Vec<FieldIssue>, rules: Vec<FieldIssue>) {
    let nulls: Vec<String> = issues.iter().map(|i| i.field.clone()).collect();
    issues.extend(rules.into_iter().filter(|issue| !nulls.contains(&issue.field)));
}

/// `POST /api/tasks` body
///
/// A client-declared owner (`userId`) is not part of the payload and is
/// dropped during deserialization. Fields may be omitted but not `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTaskPayload {
    #[serde(default, deserialize_with = "explicit")]
    pub title: Option<Option<String>>,

    #[serde(default, deserialize_with = "explicit")]
    pub status: Option<Option<String>>,

    #[serde(default, deserialize_with = "explicit")]
    pub position: Option<Option<i32>>,
}

#[derive(Validate)]
struct CreateRules {
    #[validate(
        required(message = "Title is required"),
        length(min = 1, max = 200, message = "Title must be 1-200 characters")
    )]
    title: Option<String>,

    #[validate(range(min = 0, message = "Position must be a non-negative integer"))]
    position: Option<i32>,
}

/// Normalized create input with defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskInput {
    pub title: String,
    pub status: TaskStatus,
    pub position: i32,
}

impl CreateTaskInput {
    /// Binds the input to its owner, producing a store input
    pub fn owned_by(self, user_id: Uuid) -> NewTask {
        NewTask {
            title: self.title,
            status: self.status,
            position: self.position,
            user_id: Some(user_id),
        }
    }
}

impl CreateTaskPayload {
    /// Validates the payload and applies defaults
    pub fn normalize(self) -> Result<CreateTaskInput, ValidationFailure> {
        let mut issues = Vec::new();

        let rules = CreateRules {
            title: non_null("title", self.title, &mut issues),
            position: non_null("position", self.position, &mut issues),
        };
        let status = match self.status {
            None => Some(TaskStatus::default()),
            raw => non_null("status", raw, &mut issues)
                .and_then(|raw| parse_status("status", &raw, &mut issues)),
        };
        merge_rule_issues(&mut issues, rule_issues(&rules));

        ValidationFailure::from_issues(issues)?;

        match (rules.title, status) {
            (Some(title), Some(status)) => Ok(CreateTaskInput {
                title,
                status,
                position: rules.position.unwrap_or(0),
            }),
            _ => Err(ValidationFailure::single("title", "Title is required")),
        }
    }
}

/// `PUT /api/tasks/:id` body
///
/// Omitted fields stay unchanged; `null` is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskPayload {
    #[serde(default, deserialize_with = "explicit")]
    pub title: Option<Option<String>>,

    #[serde(default, deserialize_with = "explicit")]
    pub status: Option<Option<String>>,

    #[serde(default, deserialize_with = "explicit")]
    pub position: Option<Option<i32>>,
}

#[derive(Validate)]
struct UpdateRules {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    title: Option<String>,

    #[validate(range(min = 0, message = "Position must be a non-negative integer"))]
    position: Option<i32>,
}

impl UpdateTaskPayload {
    /// Validates the payload; absent fields stay absent
    pub fn normalize(self) -> Result<UpdateTask, ValidationFailure> {
        let mut issues = Vec::new();

        let rules = UpdateRules {
            title: non_null("title", self.title, &mut issues),
            position: non_null("position", self.position, &mut issues),
        };
        let status = non_null("status", self.status, &mut issues)
            .and_then(|raw| parse_status("status", &raw, &mut issues));
        merge_rule_issues(&mut issues, rule_issues(&rules));

        ValidationFailure::from_issues(issues)?;

        Ok(UpdateTask {
            title: rules.title,
            status,
            position: rules.position,
        })
    }
}

/// One raw entry of a reposition batch
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PositionUpdatePayload {
    pub id: String,
    pub status: String,
    pub position: i64,
}

/// `POST /api/tasks/positions` body
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RepositionPayload {
    pub updates: Vec<PositionUpdatePayload>,
}

impl RepositionPayload {
    /// Validates every entry independently, keeping batch order
    pub fn normalize(self) -> Result<Vec<PositionUpdate>, ValidationFailure> {
        let mut issues = Vec::new();
        let mut updates = Vec::with_capacity(self.updates.len());

        for (index, item) in self.updates.into_iter().enumerate() {
            let prefix = format!("updates[{}]", index);

            let id = match Uuid::parse_str(&item.id) {
                Ok(id) => Some(id),
                Err(_) => {
                    issues.push(FieldIssue::new(format!("{}.id", prefix), "Id must be a valid task id"));
                    None
                }
            };

            let status = parse_status(&format!("{}.status", prefix), &item.status, &mut issues);

            let position = match i32::try_from(item.position) {
                Ok(position) if position >= 0 => Some(position),
                _ => {
                    issues.push(FieldIssue::new(format!("{}.position", prefix), POSITION_MESSAGE));
                    None
                }
            };

            if let (Some(id), Some(status), Some(position)) = (id, status, position) {
                updates.push(PositionUpdate { id, status, position });
            }
        }

        ValidationFailure::from_issues(issues)?;
        Ok(updates)
    }
}
