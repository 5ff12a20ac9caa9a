//! Handlers for the `/tasks` resource.

use axum::extract::State;
use serde::Deserialize;
use taskboard_core::types::{DbId, Timestamp};
use taskboard_db::models::task::{CreateTask, Task, TaskStatus, UpdateTask};

use crate::error::{AppError, AppResult};
use crate::extract::{JsonBody, PathParam};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

const TASK_NOT_FOUND: &str = "Задача не найдена";

/// Request body for `POST /api/tasks`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub list_id: Option<DbId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub due_at: Option<Timestamp>,
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(input): JsonBody<CreateTaskRequest>,
) -> AppResult<ApiResponse<Task>> {
    let (Some(title), Some(list_id)) = (input.title.filter(|t| !t.is_empty()), input.list_id)
    else {
        return Err(AppError::BadRequest("Укажите title и listId".into()));
    };

    state
        .store
        .find_task_list(list_id, user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Список не найден"))?;

    let task = state
        .store
        .create_task(&CreateTask {
            title,
            description: input.description,
            status: input.status.unwrap_or_default(),
            due_at: input.due_at,
            list_id,
        })
        .await?;

    tracing::info!(task_id = task.id, list_id, "Task created");
    Ok(ApiResponse::created(task))
}

/// PUT /api/tasks/{id}
///
/// Absent fields are left unchanged; `null` clears `description` or `dueAt`.
pub async fn update_task(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<DbId>,
    JsonBody(input): JsonBody<UpdateTask>,
) -> AppResult<ApiResponse<Task>> {
    if input.title.as_deref().is_some_and(str::is_empty) {
        return Err(AppError::BadRequest("Необходимо указать title".into()));
    }

    state
        .store
        .find_task(id, user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found(TASK_NOT_FOUND))?;

    let task = state
        .store
        .update_task(id, &input)
        .await?
        .ok_or_else(|| AppError::not_found(TASK_NOT_FOUND))?;
    Ok(ApiResponse::ok(task))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<DbId>,
) -> AppResult<ApiResponse<()>> {
    state
        .store
        .find_task(id, user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found(TASK_NOT_FOUND))?;

    if !state.store.delete_task(id).await? {
        return Err(AppError::not_found(TASK_NOT_FOUND));
    }
    Ok(ApiResponse::empty())
}
