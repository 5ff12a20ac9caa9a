//! Wire types exchanged with the API server.

use serde::{Deserialize, Serialize};
use taskboard_core::types::{DbId, Timestamp};
use validator::Validate;

/// The `{success, error, data, status}` envelope every API route returns.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub error: Option<String>,
    pub data: Option<T>,
    pub status: u16,
}

/// Credentials entered on the login surface.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Введите email"), email(message = "Неверный email"))]
    pub email: String,

    #[validate(length(min = 3, message = "Минимум 3 символа"))]
    pub password: String,
}

/// Access/refresh pair as stored client-side and returned by refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
}

/// `data` of a successful login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserInfo,
}

impl LoginResponse {
    pub fn token_pair(&self) -> TokenPair {
        TokenPair {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_at: Option<Timestamp>,
    pub list_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub id: DbId,
    pub title: String,
    pub user_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Present on `GET /api/task-lists`, absent on create/rename.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub list_id: DbId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<Timestamp>,
}

/// Body of `PUT /api/tasks/{id}`.
///
/// Outer `None` omits the field (unchanged); `Some(None)` sends `null` to
/// clear it.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<Option<Timestamp>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_form_rules() {
        let ok = LoginForm {
            email: "alice@prisma.io".into(),
            password: "abc".into(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginForm {
            email: "not-an-email".into(),
            password: "ab".into(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn task_changes_omit_untouched_fields() {
        let changes = TaskChanges {
            status: Some(TaskStatus::Done),
            due_at: Some(None),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&changes).unwrap(),
            serde_json::json!({ "status": "DONE", "dueAt": null })
        );
    }
}
