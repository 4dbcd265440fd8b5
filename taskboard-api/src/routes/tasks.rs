/// Task endpoints
///
/// - `PATCH /api/tasks/:id/status` - Move a task along its workflow
///
/// Allowed moves: todo -> in_progress, in_progress -> review,
/// in_progress -> todo, review -> done, review -> in_progress and
/// done -> in_progress (reopen).

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::parse_id,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::task::{Task, TaskStatus},
};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskStatusRequest {
    #[validate(required(message = "Status is required"))]
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub message: String,
    pub task: Task,
}

/// Change a task's status
///
/// Setting the current status again succeeds without changes.
///
/// # Errors
///
/// - `400 Bad Request`: Bad id, missing or unknown status, disallowed transition
/// - `404 Not Found`: No such task
pub async fn update_task_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskStatusRequest>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let task_id = parse_id(&id, "task")?;
    let Json(req) = payload?;
    req.validate()?;
    let Some(target) = req.status else {
        return Err(ApiError::BadRequest("Status is required".to_string()));
    };

    let task = state
        .store
        .find_task(task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if task.status == target {
        return Ok(Json(TaskResponse {
            message: "Task status unchanged".to_string(),
            task,
        }));
    }

    if !task.status.can_transition_to(target) {
        return Err(ApiError::BadRequest(format!(
            "Cannot move task from {} to {}",
            task.status, target
        )));
    }

    let task = state
        .store
        .update_task_status(task_id, target)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(task_id, status = %target, user_id = auth.user_id, "Task status updated");

    Ok(Json(TaskResponse {
        message: "Task status updated".to_string(),
        task,
    }))
}
