//! Integration tests for the task-list and task routes.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    access_token, body_json, create_test_user, delete_auth, get_auth, post_json_auth,
    put_json_auth,
};
use serde_json::json;
use taskboard_db::MemoryStore;

async fn two_users() -> (axum::Router, String, String) {
    let store = Arc::new(MemoryStore::new());
    create_test_user(&store, "alice@example.com").await;
    create_test_user(&store, "mallory@example.com").await;
    let app = common::build_test_app(store);
    let alice = access_token(app.clone(), "alice@example.com").await;
    let mallory = access_token(app.clone(), "mallory@example.com").await;
    (app, alice, mallory)
}

async fn create_list(app: axum::Router, token: &str, title: &str) -> i64 {
    let response = post_json_auth(app, "/api/task-lists", token, json!({ "title": title })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_list_crud_round() {
    let (app, alice, _) = two_users().await;

    let id = create_list(app.clone(), &alice, "Inbox").await;

    let response = put_json_auth(
        app.clone(),
        &format!("/api/task-lists/{id}"),
        &alice,
        json!({ "title": "Work" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["title"], "Work");

    let response = get_auth(app.clone(), "/api/task-lists", &alice).await;
    let lists = body_json(response).await["data"].clone();
    assert_eq!(lists.as_array().unwrap().len(), 1);
    assert_eq!(lists[0]["title"], "Work");
    assert_eq!(lists[0]["tasks"], json!([]));

    let response = delete_auth(app.clone(), &format!("/api/task-lists/{id}"), &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"].is_null());

    let response = delete_auth(app, &format!("/api/task-lists/{id}"), &alice).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Список задач не найден");
}

#[tokio::test]
async fn test_list_title_is_required() {
    let (app, alice, _) = two_users().await;

    let response = post_json_auth(app.clone(), "/api/task-lists", &alice, json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Необходимо указать title");

    let id = create_list(app.clone(), &alice, "Inbox").await;
    let response = put_json_auth(
        app,
        &format!("/api/task-lists/{id}"),
        &alice,
        json!({ "title": "" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_lists_are_scoped_to_owner() {
    let (app, alice, mallory) = two_users().await;
    let id = create_list(app.clone(), &alice, "Private").await;

    let response = get_auth(app.clone(), "/api/task-lists", &mallory).await;
    assert_eq!(body_json(response).await["data"], json!([]));

    let response = put_json_auth(
        app.clone(),
        &format!("/api/task-lists/{id}"),
        &mallory,
        json!({ "title": "Mine now" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app, &format!("/api/task-lists/{id}"), &mallory).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_task_lifecycle() {
    let (app, alice, _) = two_users().await;
    let list_id = create_list(app.clone(), &alice, "Inbox").await;

    let response = post_json_auth(
        app.clone(),
        "/api/tasks",
        &alice,
        json!({
            "title": "Write report",
            "listId": list_id,
            "description": "quarterly",
            "dueAt": "2030-12-31T23:59:59Z"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let task = body_json(response).await["data"].clone();
    assert_eq!(task["status"], "PENDING");
    assert_eq!(task["listId"], list_id);
    let task_id = task["id"].as_i64().unwrap();

    // Only status changes; description and dueAt stay.
    let response = put_json_auth(
        app.clone(),
        &format!("/api/tasks/{task_id}"),
        &alice,
        json!({ "status": "IN_PROGRESS" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["status"], "IN_PROGRESS");
    assert_eq!(updated["description"], "quarterly");
    assert!(updated["dueAt"].is_string());

    // Explicit nulls clear the nullable fields.
    let response = put_json_auth(
        app.clone(),
        &format!("/api/tasks/{task_id}"),
        &alice,
        json!({ "description": null, "dueAt": null }),
    )
    .await;
    let cleared = body_json(response).await["data"].clone();
    assert!(cleared["description"].is_null());
    assert!(cleared["dueAt"].is_null());
    assert_eq!(cleared["title"], "Write report");

    let response = get_auth(app.clone(), "/api/task-lists", &alice).await;
    let lists = body_json(response).await["data"].clone();
    assert_eq!(lists[0]["tasks"].as_array().unwrap().len(), 1);

    let response = delete_auth(app.clone(), &format!("/api/tasks/{task_id}"), &alice).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete_auth(app, &format!("/api/tasks/{task_id}"), &alice).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Задача не найдена");
}

#[tokio::test]
async fn test_create_task_validation() {
    let (app, alice, mallory) = two_users().await;
    let list_id = create_list(app.clone(), &alice, "Inbox").await;

    let response = post_json_auth(app.clone(), "/api/tasks", &alice, json!({ "title": "x" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Укажите title и listId");

    let response = post_json_auth(
        app,
        "/api/tasks",
        &mallory,
        json!({ "title": "sneaky", "listId": list_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Список не найден");
}

#[tokio::test]
async fn test_tasks_in_foreign_lists_are_invisible() {
    let (app, alice, mallory) = two_users().await;
    let list_id = create_list(app.clone(), &alice, "Inbox").await;
    let response = post_json_auth(
        app.clone(),
        "/api/tasks",
        &alice,
        json!({ "title": "secret", "listId": list_id }),
    )
    .await;
    let task_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = put_json_auth(
        app.clone(),
        &format!("/api/tasks/{task_id}"),
        &mallory,
        json!({ "title": "owned" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app, &format!("/api/tasks/{task_id}"), &mallory).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_a_list_removes_its_tasks() {
    let (app, alice, _) = two_users().await;
    let list_id = create_list(app.clone(), &alice, "Temp").await;
    let response = post_json_auth(
        app.clone(),
        "/api/tasks",
        &alice,
        json!({ "title": "t", "listId": list_id }),
    )
    .await;
    let task_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    delete_auth(app.clone(), &format!("/api/task-lists/{list_id}"), &alice).await;

    let response = delete_auth(app, &format!("/api/tasks/{task_id}"), &alice).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
