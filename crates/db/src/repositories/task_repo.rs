//! Repository for the `tasks` table.

use sqlx::PgPool;
use taskboard_core::types::DbId;

use crate::models::task::{CreateTask, Task, UpdateTask};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, title, description, status, due_at, list_id, created_at, updated_at";

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (title, description, status, due_at, list_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status)
            .bind(input.due_at)
            .bind(input.list_id)
            .fetch_one(pool)
            .await
    }

    /// All tasks belonging to any of the given lists.
    pub async fn list_for_lists(pool: &PgPool, list_ids: &[DbId]) -> Result<Vec<Task>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM tasks WHERE list_id = ANY($1) ORDER BY list_id, id");
        sqlx::query_as::<_, Task>(&query)
            .bind(list_ids)
            .fetch_all(pool)
            .await
    }

    /// Find a task whose list is owned by `user_id`.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = "SELECT t.id, t.title, t.description, t.status, t.due_at, t.list_id, \
                     t.created_at, t.updated_at
                     FROM tasks t
                     JOIN task_lists l ON l.id = t.list_id
                     WHERE t.id = $1 AND l.user_id = $2";
        sqlx::query_as::<_, Task>(query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a task. `None` fields are left unchanged; see [`UpdateTask`].
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                status = COALESCE($5, status),
                due_at = CASE WHEN $6 THEN $7 ELSE due_at END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.description.is_some())
            .bind(input.description.clone().flatten())
            .bind(input.status)
            .bind(input.due_at.is_some())
            .bind(input.due_at.flatten())
            .fetch_optional(pool)
            .await
    }

    /// Delete a task. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
