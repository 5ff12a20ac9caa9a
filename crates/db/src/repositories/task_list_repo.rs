//! Repository for the `task_lists` table.

use sqlx::PgPool;
use taskboard_core::types::DbId;

use crate::models::task_list::{CreateTaskList, TaskList};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, user_id, created_at, updated_at";

/// Provides CRUD operations for task lists. Every query is scoped to an owner.
pub struct TaskListRepo;

impl TaskListRepo {
    /// Insert a new task list, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTaskList) -> Result<TaskList, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_lists (title, user_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskList>(&query)
            .bind(&input.title)
            .bind(input.user_id)
            .fetch_one(pool)
            .await
    }

    /// List a user's task lists in creation order.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<TaskList>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM task_lists WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, TaskList>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Find a task list owned by `user_id`.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<TaskList>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM task_lists WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, TaskList>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Rename a task list owned by `user_id`.
    ///
    /// Returns `None` if no such row exists for this owner.
    pub async fn update_title(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        title: &str,
    ) -> Result<Option<TaskList>, sqlx::Error> {
        let query = format!(
            "UPDATE task_lists SET title = $3, updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskList>(&query)
            .bind(id)
            .bind(user_id)
            .bind(title)
            .fetch_optional(pool)
            .await
    }

    /// Delete a task list (and, by cascade, its tasks). Returns `true` if deleted.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_lists WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
