//! Handlers for the `/task-lists` resource.
//!
//! Every operation is scoped to the authenticated user's own lists; a list
//! owned by someone else is indistinguishable from a missing one.

use axum::extract::State;
use serde::Deserialize;
use taskboard_core::types::DbId;
use taskboard_db::models::task_list::{CreateTaskList, TaskList, TaskListWithTasks};

use crate::error::{AppError, AppResult};
use crate::extract::{JsonBody, PathParam};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

const LIST_NOT_FOUND: &str = "Список задач не найден";

/// Request body for creating or renaming a list.
#[derive(Debug, Deserialize)]
pub struct TaskListTitle {
    #[serde(default)]
    pub title: Option<String>,
}

impl TaskListTitle {
    fn require(self) -> AppResult<String> {
        self.title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("Необходимо указать title".into()))
    }
}

/// GET /api/task-lists
pub async fn list_task_lists(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<Vec<TaskListWithTasks>>> {
    let lists = state.store.task_lists_with_tasks(user.user_id).await?;
    Ok(ApiResponse::ok(lists))
}

/// POST /api/task-lists
pub async fn create_task_list(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(input): JsonBody<TaskListTitle>,
) -> AppResult<ApiResponse<TaskList>> {
    let title = input.require()?;
    let list = state
        .store
        .create_task_list(&CreateTaskList {
            title,
            user_id: user.user_id,
        })
        .await?;

    tracing::info!(list_id = list.id, user_id = user.user_id, "Task list created");
    Ok(ApiResponse::created(list))
}

/// PUT /api/task-lists/{id}
pub async fn update_task_list(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<DbId>,
    JsonBody(input): JsonBody<TaskListTitle>,
) -> AppResult<ApiResponse<TaskList>> {
    let title = input.require()?;
    let list = state
        .store
        .rename_task_list(id, user.user_id, &title)
        .await?
        .ok_or_else(|| AppError::not_found(LIST_NOT_FOUND))?;
    Ok(ApiResponse::ok(list))
}

/// DELETE /api/task-lists/{id}
///
/// Deletes the list together with its tasks.
pub async fn delete_task_list(
    State(state): State<AppState>,
    user: AuthUser,
    PathParam(id): PathParam<DbId>,
) -> AppResult<ApiResponse<()>> {
    if !state.store.delete_task_list(id, user.user_id).await? {
        return Err(AppError::not_found(LIST_NOT_FOUND));
    }
    tracing::info!(list_id = id, user_id = user.user_id, "Task list deleted");
    Ok(ApiResponse::empty())
}
