pub mod auth;
pub mod health;
pub mod task;
pub mod task_list;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /auth/login                  login (public)
/// /auth/refresh                refresh (public)
/// /auth/logout                 logout (public, takes the refresh token)
///
/// /task-lists                  list with tasks, create (auth)
/// /task-lists/{id}             rename, delete (auth)
///
/// /tasks                       create (auth)
/// /tasks/{id}                  update, delete (auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/task-lists", task_list::router())
        .nest("/tasks", task::router())
}
