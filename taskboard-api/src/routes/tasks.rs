/// Task endpoints
///
/// All endpoints require authentication. Lists and creates are scoped to
/// the caller; updates and deletes first probe for a task the caller owns
/// and answer 404 otherwise.
///
/// # Endpoints
///
/// - `GET /api/tasks` - List the caller's tasks
/// - `POST /api/tasks` - Create task
/// - `PUT /api/tasks/:id` - Partially update task
/// - `DELETE /api/tasks/:id` - Delete task
/// - `POST /api/tasks/positions` - Apply a batch of status/position changes
///
/// # Batch ownership
///
/// `POST /api/tasks/positions` does not check who owns the referenced tasks.
/// Any authenticated caller can move any task by id.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidJson,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::task::Task,
    validation::{CreateTaskPayload, RepositionPayload, UpdateTaskPayload},
};
use tracing::{debug, info};
use uuid::Uuid;

/// Reposition response
#[derive(Debug, Serialize, Deserialize)]
pub struct RepositionResponse {
    /// Always true; failures use the error body
    pub success: bool,
}

/// Path ids that are not task ids name no task
fn parse_task_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Task not found".to_string()))
}

/// Resolves a task the caller owns, or 404
async fn owned_task(state: &AppState, id: Uuid, auth: &AuthContext) -> ApiResult<Task> {
    state
        .store
        .get_by_id(id, Some(auth.user_id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

/// List tasks
///
/// Returns the caller's tasks ordered by status, then position.
///
/// # Endpoint
///
/// ```text
/// GET /api/tasks
/// Authorization: Bearer <jwt_token>
/// ```
///
/// # Response
///
/// ```json
/// [
///   {
///     "id": "uuid",
///     "title": "Write spec",
///     "status": "doing",
///     "position": 0,
///     "userId": "uuid",
///     "createdAt": "2025-01-03T12:00:00Z",
///     "updatedAt": "2025-01-03T12:00:00Z"
///   }
/// ]
/// ```
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.store.list(Some(auth.user_id)).await?;
    debug!(user_id = %auth.user_id, count = tasks.len(), "Listed tasks");
    Ok(Json(tasks))
}

/// Create task
///
/// The owner is always the caller.
///
/// # Endpoint
///
/// ```text
/// POST /api/tasks
/// Authorization: Bearer <jwt_token>
/// Content-Type: application/json
///
/// { "title": "Write spec", "status": "todo", "position": 0 }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid credentials
/// - `500 Internal Server Error`: Server error
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(payload): ValidJson<CreateTaskPayload>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let input = payload.normalize()?;

    let task = state.store.create(input.owned_by(auth.user_id)).await?;

    info!(
        user_id = %auth.user_id,
        task_id = %task.id,
        status = %task.status,
        "Task created"
    );

    Ok((StatusCode::CREATED, Json(task)))
}

/// Update task
///
/// Absent fields are left unchanged. An empty body only refreshes
/// `updatedAt`.
///
/// # Endpoint
///
/// ```text
/// PUT /api/tasks/:id
/// Authorization: Bearer <jwt_token>
/// Content-Type: application/json
///
/// { "status": "doing" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid credentials
/// - `404 Not Found`: No task with this id owned by the caller
/// - `500 Internal Server Error`: Server error
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<UpdateTaskPayload>,
) -> ApiResult<Json<Task>> {
    let changes = payload.normalize()?;
    let id = parse_task_id(&id)?;

    owned_task(&state, id, &auth).await?;
    let task = state.store.update(id, changes).await?;

    info!(user_id = %auth.user_id, task_id = %task.id, "Task updated");

    Ok(Json(task))
}

/// Delete task
///
/// Returns the deleted record. Deleting the same id again is a 404.
///
/// # Endpoint
///
/// ```text
/// DELETE /api/tasks/:id
/// Authorization: Bearer <jwt_token>
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid credentials
/// - `404 Not Found`: No task with this id owned by the caller
/// - `500 Internal Server Error`: Server error
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_task_id(&id)?;

    owned_task(&state, id, &auth).await?;
    let task = state.store.delete(id).await?;

    info!(user_id = %auth.user_id, task_id = %task.id, "Task deleted");

    Ok(Json(task))
}

/// Reposition tasks
///
/// Applies every `(id, status, position)` triple in one transaction. Either
/// all of them land or none do.
///
/// # Endpoint
///
/// ```text
/// POST /api/tasks/positions
/// Authorization: Bearer <jwt_token>
/// Content-Type: application/json
///
/// { "updates": [{ "id": "uuid", "status": "done", "position": 0 }] }
/// ```
///
/// # Response
///
/// ```json
/// { "success": true }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid credentials
/// - `404 Not Found`: Some id names no task; nothing was changed
/// - `500 Internal Server Error`: Server error
pub async fn reposition_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(payload): ValidJson<RepositionPayload>,
) -> ApiResult<Json<RepositionResponse>> {
    let updates = payload.normalize()?;

    state.store.bulk_reposition(&updates).await?;

    info!(user_id = %auth.user_id, count = updates.len(), "Tasks repositioned");

    Ok(Json(RepositionResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_task_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_task_id("not-a-uuid"), Err(ApiError::NotFound(_))));
        assert!(matches!(parse_task_id(""), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_reposition_response_shape() {
        let body = serde_json::to_value(RepositionResponse { success: true }).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true }));
    }
}
