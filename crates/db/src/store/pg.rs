use async_trait::async_trait;
use taskboard_core::types::{DbId, Timestamp};

use super::Store;
use crate::error::DbResult;
use crate::models::session::{CreateSession, Session};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::task_list::{CreateTaskList, TaskList, TaskListWithTasks};
use crate::models::user::{CreateUser, User};
use crate::repositories::{SessionRepo, TaskListRepo, TaskRepo, UserRepo};
use crate::DbPool;

/// [`Store`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> DbResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }

    async fn create_user(&self, input: &CreateUser) -> DbResult<User> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn find_user_by_id(&self, id: DbId) -> DbResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> DbResult<Option<User>> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn create_session(&self, input: &CreateSession) -> DbResult<Session> {
        Ok(SessionRepo::create(&self.pool, input).await?)
    }

    async fn find_session(&self, refresh_token: &str, user_id: DbId) -> DbResult<Option<Session>> {
        Ok(SessionRepo::find_by_token(&self.pool, refresh_token, user_id).await?)
    }

    async fn sessions_for_user(&self, user_id: DbId) -> DbResult<Vec<Session>> {
        Ok(SessionRepo::list_for_user(&self.pool, user_id).await?)
    }

    async fn delete_session(&self, id: DbId) -> DbResult<bool> {
        Ok(SessionRepo::delete(&self.pool, id).await?)
    }

    async fn delete_session_by_token(&self, refresh_token: &str) -> DbResult<bool> {
        Ok(SessionRepo::delete_by_token(&self.pool, refresh_token).await?)
    }

    async fn rotate_session(
        &self,
        consumed: DbId,
        replacement: &CreateSession,
    ) -> DbResult<Option<Session>> {
        Ok(SessionRepo::rotate(&self.pool, consumed, replacement).await?)
    }

    async fn delete_expired_sessions(&self, now: Timestamp) -> DbResult<u64> {
        Ok(SessionRepo::delete_expired(&self.pool, now).await?)
    }

    async fn task_lists_with_tasks(&self, user_id: DbId) -> DbResult<Vec<TaskListWithTasks>> {
        let lists = TaskListRepo::list_for_user(&self.pool, user_id).await?;
        let ids: Vec<DbId> = lists.iter().map(|l| l.id).collect();
        let mut tasks = TaskRepo::list_for_lists(&self.pool, &ids).await?;

        Ok(lists
            .into_iter()
            .map(|list| {
                let (own, rest): (Vec<Task>, Vec<Task>) =
                    tasks.drain(..).partition(|t| t.list_id == list.id);
                tasks = rest;
                TaskListWithTasks { list, tasks: own }
            })
            .collect())
    }

    async fn create_task_list(&self, input: &CreateTaskList) -> DbResult<TaskList> {
        Ok(TaskListRepo::create(&self.pool, input).await?)
    }

    async fn find_task_list(&self, id: DbId, user_id: DbId) -> DbResult<Option<TaskList>> {
        Ok(TaskListRepo::find_owned(&self.pool, id, user_id).await?)
    }

    async fn rename_task_list(
        &self,
        id: DbId,
        user_id: DbId,
        title: &str,
    ) -> DbResult<Option<TaskList>> {
        Ok(TaskListRepo::update_title(&self.pool, id, user_id, title).await?)
    }

    async fn delete_task_list(&self, id: DbId, user_id: DbId) -> DbResult<bool> {
        Ok(TaskListRepo::delete(&self.pool, id, user_id).await?)
    }

    async fn create_task(&self, input: &CreateTask) -> DbResult<Task> {
        Ok(TaskRepo::create(&self.pool, input).await?)
    }

    async fn find_task(&self, id: DbId, user_id: DbId) -> DbResult<Option<Task>> {
        Ok(TaskRepo::find_owned(&self.pool, id, user_id).await?)
    }

    async fn update_task(&self, id: DbId, input: &UpdateTask) -> DbResult<Option<Task>> {
        Ok(TaskRepo::update(&self.pool, id, input).await?)
    }

    async fn delete_task(&self, id: DbId) -> DbResult<bool> {
        Ok(TaskRepo::delete(&self.pool, id).await?)
    }
}
