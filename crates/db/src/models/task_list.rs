//! Task list entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use taskboard_core::types::{DbId, Timestamp};

use super::task::Task;

/// A row from the `task_lists` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub id: DbId,
    pub title: String,
    pub user_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A task list together with all of its tasks.
#[derive(Debug, Clone, Serialize)]
pub struct TaskListWithTasks {
    #[serde(flatten)]
    pub list: TaskList,
    pub tasks: Vec<Task>,
}

/// DTO for creating a new task list.
#[derive(Debug, Clone)]
pub struct CreateTaskList {
    pub title: String,
    pub user_id: DbId,
}
