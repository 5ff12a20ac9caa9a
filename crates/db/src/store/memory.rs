use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use taskboard_core::types::{DbId, Timestamp};
use tokio::sync::Mutex;

use super::Store;
use crate::error::{DbError, DbResult};
use crate::models::session::{CreateSession, Session};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::models::task_list::{CreateTaskList, TaskList, TaskListWithTasks};
use crate::models::user::{CreateUser, User};

#[derive(Default)]
struct Tables {
    next_id: DbId,
    users: Vec<User>,
    sessions: Vec<Session>,
    task_lists: Vec<TaskList>,
    tasks: Vec<Task>,
}

impl Tables {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn owns_list(&self, list_id: DbId, user_id: DbId) -> bool {
        self.task_lists
            .iter()
            .any(|l| l.id == list_id && l.user_id == user_id)
    }
}

/// In-process [`Store`] with the same constraints as the SQL schema
/// (unique email, unique refresh token, owner cascades).
///
/// [`set_available(false)`](MemoryStore::set_available) makes every call fail
/// with [`DbError::Unavailable`] without touching state.
pub struct MemoryStore {
    tables: Mutex<Tables>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            available: AtomicBool::new(true),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check(&self) -> DbResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DbError::Unavailable("memory store switched off".into()))
        }
    }
}

fn unique_violation(what: &str) -> DbError {
    DbError::Sqlx(sqlx::Error::Protocol(format!("duplicate {what}")))
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> DbResult<()> {
        self.check()
    }

    async fn create_user(&self, input: &CreateUser) -> DbResult<User> {
        self.check()?;
        let mut t = self.tables.lock().await;
        if t.users.iter().any(|u| u.email == input.email) {
            return Err(unique_violation("email"));
        }
        let user = User {
            id: t.next_id(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            created_at: Utc::now(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: DbId) -> DbResult<Option<User>> {
        self.check()?;
        let t = self.tables.lock().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> DbResult<Option<User>> {
        self.check()?;
        let t = self.tables.lock().await;
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_session(&self, input: &CreateSession) -> DbResult<Session> {
        self.check()?;
        let mut t = self.tables.lock().await;
        if t.sessions.iter().any(|s| s.refresh_token == input.refresh_token) {
            return Err(unique_violation("refresh token"));
        }
        let session = Session {
            id: t.next_id(),
            user_id: input.user_id,
            refresh_token: input.refresh_token.clone(),
            expires_at: input.expires_at,
            created_at: Utc::now(),
        };
        t.sessions.push(session.clone());
        Ok(session)
    }

    async fn find_session(&self, refresh_token: &str, user_id: DbId) -> DbResult<Option<Session>> {
        self.check()?;
        let t = self.tables.lock().await;
        Ok(t.sessions
            .iter()
            .find(|s| s.refresh_token == refresh_token && s.user_id == user_id)
            .cloned())
    }

    async fn sessions_for_user(&self, user_id: DbId) -> DbResult<Vec<Session>> {
        self.check()?;
        let t = self.tables.lock().await;
        Ok(t.sessions
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_session(&self, id: DbId) -> DbResult<bool> {
        self.check()?;
        let mut t = self.tables.lock().await;
        let before = t.sessions.len();
        t.sessions.retain(|s| s.id != id);
        Ok(t.sessions.len() < before)
    }

    async fn delete_session_by_token(&self, refresh_token: &str) -> DbResult<bool> {
        self.check()?;
        let mut t = self.tables.lock().await;
        let before = t.sessions.len();
        t.sessions.retain(|s| s.refresh_token != refresh_token);
        Ok(t.sessions.len() < before)
    }

    async fn rotate_session(
        &self,
        consumed: DbId,
        replacement: &CreateSession,
    ) -> DbResult<Option<Session>> {
        self.check()?;
        let mut t = self.tables.lock().await;
        let Some(index) = t.sessions.iter().position(|s| s.id == consumed) else {
            return Ok(None);
        };
        if t.sessions
            .iter()
            .any(|s| s.refresh_token == replacement.refresh_token)
        {
            return Err(unique_violation("refresh token"));
        }
        t.sessions.remove(index);
        let session = Session {
            id: t.next_id(),
            user_id: replacement.user_id,
            refresh_token: replacement.refresh_token.clone(),
            expires_at: replacement.expires_at,
            created_at: Utc::now(),
        };
        t.sessions.push(session.clone());
        Ok(Some(session))
    }

    async fn delete_expired_sessions(&self, now: Timestamp) -> DbResult<u64> {
        self.check()?;
        let mut t = self.tables.lock().await;
        let before = t.sessions.len();
        t.sessions.retain(|s| s.expires_at >= now);
        Ok((before - t.sessions.len()) as u64)
    }

    async fn task_lists_with_tasks(&self, user_id: DbId) -> DbResult<Vec<TaskListWithTasks>> {
        self.check()?;
        let t = self.tables.lock().await;
        Ok(t.task_lists
            .iter()
            .filter(|l| l.user_id == user_id)
            .map(|list| TaskListWithTasks {
                list: list.clone(),
                tasks: t
                    .tasks
                    .iter()
                    .filter(|task| task.list_id == list.id)
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    async fn create_task_list(&self, input: &CreateTaskList) -> DbResult<TaskList> {
        self.check()?;
        let mut t = self.tables.lock().await;
        let now = Utc::now();
        let list = TaskList {
            id: t.next_id(),
            title: input.title.clone(),
            user_id: input.user_id,
            created_at: now,
            updated_at: now,
        };
        t.task_lists.push(list.clone());
        Ok(list)
    }

    async fn find_task_list(&self, id: DbId, user_id: DbId) -> DbResult<Option<TaskList>> {
        self.check()?;
        let t = self.tables.lock().await;
        Ok(t.task_lists
            .iter()
            .find(|l| l.id == id && l.user_id == user_id)
            .cloned())
    }

    async fn rename_task_list(
        &self,
        id: DbId,
        user_id: DbId,
        title: &str,
    ) -> DbResult<Option<TaskList>> {
        self.check()?;
        let mut t = self.tables.lock().await;
        let Some(list) = t
            .task_lists
            .iter_mut()
            .find(|l| l.id == id && l.user_id == user_id)
        else {
            return Ok(None);
        };
        list.title = title.to_string();
        list.updated_at = Utc::now();
        Ok(Some(list.clone()))
    }

    async fn delete_task_list(&self, id: DbId, user_id: DbId) -> DbResult<bool> {
        self.check()?;
        let mut t = self.tables.lock().await;
        if !t.owns_list(id, user_id) {
            return Ok(false);
        }
        t.task_lists.retain(|l| l.id != id);
        t.tasks.retain(|task| task.list_id != id);
        Ok(true)
    }

    async fn create_task(&self, input: &CreateTask) -> DbResult<Task> {
        self.check()?;
        let mut t = self.tables.lock().await;
        if !t.task_lists.iter().any(|l| l.id == input.list_id) {
            return Err(DbError::Sqlx(sqlx::Error::Protocol(
                "task list does not exist".into(),
            )));
        }
        let now = Utc::now();
        let task = Task {
            id: t.next_id(),
            title: input.title.clone(),
            description: input.description.clone(),
            status: input.status,
            due_at: input.due_at,
            list_id: input.list_id,
            created_at: now,
            updated_at: now,
        };
        t.tasks.push(task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: DbId, user_id: DbId) -> DbResult<Option<Task>> {
        self.check()?;
        let t = self.tables.lock().await;
        Ok(t.tasks
            .iter()
            .find(|task| task.id == id && t.owns_list(task.list_id, user_id))
            .cloned())
    }

    async fn update_task(&self, id: DbId, input: &UpdateTask) -> DbResult<Option<Task>> {
        self.check()?;
        let mut t = self.tables.lock().await;
        let Some(task) = t.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(None);
        };
        if let Some(title) = &input.title {
            task.title = title.clone();
        }
        if let Some(description) = &input.description {
            task.description = description.clone();
        }
        if let Some(status) = input.status {
            task.status = status;
        }
        if let Some(due_at) = input.due_at {
            task.due_at = due_at;
        }
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: DbId) -> DbResult<bool> {
        self.check()?;
        let mut t = self.tables.lock().await;
        let before = t.tasks.len();
        t.tasks.retain(|task| task.id != id);
        Ok(t.tasks.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Duration;

    use super::*;
    use crate::models::task::TaskStatus;

    async fn seeded() -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let user = store
            .create_user(&CreateUser {
                email: "alice@example.com".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap();
        (store, user)
    }

    fn session_input(user_id: DbId, token: &str) -> CreateSession {
        CreateSession {
            user_id,
            refresh_token: token.into(),
            expires_at: Utc::now() + Duration::days(7),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (store, _) = seeded().await;
        let result = store
            .create_user(&CreateUser {
                email: "alice@example.com".into(),
                password_hash: "other".into(),
            })
            .await;
        assert_matches!(result, Err(DbError::Sqlx(_)));
    }

    #[tokio::test]
    async fn rotation_replaces_the_consumed_session() {
        let (store, user) = seeded().await;
        let old = store
            .create_session(&session_input(user.id, "old"))
            .await
            .unwrap();

        let new = store
            .rotate_session(old.id, &session_input(user.id, "new"))
            .await
            .unwrap()
            .expect("consumed session exists");

        assert_eq!(new.refresh_token, "new");
        assert!(store.find_session("old", user.id).await.unwrap().is_none());
        assert!(store.find_session("new", user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rotating_a_missing_session_changes_nothing() {
        let (store, user) = seeded().await;
        let old = store
            .create_session(&session_input(user.id, "old"))
            .await
            .unwrap();
        store.delete_session(old.id).await.unwrap();

        let rotated = store
            .rotate_session(old.id, &session_input(user.id, "new"))
            .await
            .unwrap();

        assert!(rotated.is_none());
        assert!(store.sessions_for_user(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unavailable_store_fails_without_side_effects() {
        let (store, user) = seeded().await;
        store.set_available(false);

        let result = store.create_session(&session_input(user.id, "t")).await;
        assert_matches!(result, Err(DbError::Unavailable(_)));

        store.set_available(true);
        assert!(store.sessions_for_user(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn expired_sessions_are_purged() {
        let (store, user) = seeded().await;
        let mut stale = session_input(user.id, "stale");
        stale.expires_at = Utc::now() - Duration::minutes(1);
        store.create_session(&stale).await.unwrap();
        store
            .create_session(&session_input(user.id, "fresh"))
            .await
            .unwrap();

        let purged = store.delete_expired_sessions(Utc::now()).await.unwrap();

        assert_eq!(purged, 1);
        let remaining = store.sessions_for_user(user.id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].refresh_token, "fresh");
    }

    #[tokio::test]
    async fn deleting_a_list_cascades_to_tasks() {
        let (store, user) = seeded().await;
        let list = store
            .create_task_list(&CreateTaskList {
                title: "Inbox".into(),
                user_id: user.id,
            })
            .await
            .unwrap();
        let task = store
            .create_task(&CreateTask {
                title: "Write report".into(),
                description: None,
                status: TaskStatus::Pending,
                due_at: None,
                list_id: list.id,
            })
            .await
            .unwrap();

        assert!(store.delete_task_list(list.id, user.id).await.unwrap());
        assert!(store.find_task(task.id, user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lists_are_scoped_to_their_owner() {
        let (store, user) = seeded().await;
        let list = store
            .create_task_list(&CreateTaskList {
                title: "Private".into(),
                user_id: user.id,
            })
            .await
            .unwrap();

        let stranger = user.id + 1000;
        assert!(store.find_task_list(list.id, stranger).await.unwrap().is_none());
        assert!(!store.delete_task_list(list.id, stranger).await.unwrap());
        assert!(store
            .rename_task_list(list.id, stranger, "Mine now")
            .await
            .unwrap()
            .is_none());
    }
}
