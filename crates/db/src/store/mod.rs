//! The [`Store`] trait: every persistence operation the API needs.
//!
//! [`PgStore`] is the production implementation over the static repositories.
//! [`MemoryStore`] keeps everything in process and is used by tests and local
//! tooling.

mod memory;
mod pg;

use async_trait::async_trait;
use taskboard_core::types::{DbId, Timestamp};

use crate::error::DbResult;
use crate::models::session::{CreateSession, Session};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::task_list::{CreateTaskList, TaskList, TaskListWithTasks};
use crate::models::user::{CreateUser, User};

pub use memory::MemoryStore;
pub use pg::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap reachability probe used by the health endpoint.
    async fn ping(&self) -> DbResult<()>;

    // --- users ---

    async fn create_user(&self, input: &CreateUser) -> DbResult<User>;

    async fn find_user_by_id(&self, id: DbId) -> DbResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> DbResult<Option<User>>;

    // --- sessions ---

    async fn create_session(&self, input: &CreateSession) -> DbResult<Session>;

    /// Session matching both the raw refresh token and its owner.
    async fn find_session(&self, refresh_token: &str, user_id: DbId) -> DbResult<Option<Session>>;

    async fn sessions_for_user(&self, user_id: DbId) -> DbResult<Vec<Session>>;

    async fn delete_session(&self, id: DbId) -> DbResult<bool>;

    async fn delete_session_by_token(&self, refresh_token: &str) -> DbResult<bool>;

    /// Atomically delete `consumed` and insert `replacement`.
    ///
    /// `Ok(None)` means `consumed` was already gone and nothing changed.
    async fn rotate_session(
        &self,
        consumed: DbId,
        replacement: &CreateSession,
    ) -> DbResult<Option<Session>>;

    async fn delete_expired_sessions(&self, now: Timestamp) -> DbResult<u64>;

    // --- task lists ---

    async fn task_lists_with_tasks(&self, user_id: DbId) -> DbResult<Vec<TaskListWithTasks>>;

    async fn create_task_list(&self, input: &CreateTaskList) -> DbResult<TaskList>;

    async fn find_task_list(&self, id: DbId, user_id: DbId) -> DbResult<Option<TaskList>>;

    async fn rename_task_list(
        &self,
        id: DbId,
        user_id: DbId,
        title: &str,
    ) -> DbResult<Option<TaskList>>;

    async fn delete_task_list(&self, id: DbId, user_id: DbId) -> DbResult<bool>;

    // --- tasks ---

    async fn create_task(&self, input: &CreateTask) -> DbResult<Task>;

    /// Task whose list belongs to `user_id`.
    async fn find_task(&self, id: DbId, user_id: DbId) -> DbResult<Option<Task>>;

    async fn update_task(&self, id: DbId, input: &UpdateTask) -> DbResult<Option<Task>>;

    async fn delete_task(&self, id: DbId) -> DbResult<bool>;
}
