use axum::routing::{get, put};
use axum::Router;

use crate::handlers::task_list;
use crate::state::AppState;

/// Routes mounted at `/task-lists`.
///
/// ```text
/// GET    /       -> list_task_lists (with nested tasks)
/// POST   /       -> create_task_list
/// PUT    /{id}   -> update_task_list
/// DELETE /{id}   -> delete_task_list
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(task_list::list_task_lists).post(task_list::create_task_list),
        )
        .route(
            "/{id}",
            put(task_list::update_task_list).delete(task_list::delete_task_list),
        )
}
