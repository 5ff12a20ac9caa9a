use axum::routing::{post, put};
use axum::Router;

use crate::handlers::task;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// POST   /       -> create_task
/// PUT    /{id}   -> update_task
/// DELETE /{id}   -> delete_task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(task::create_task))
        .route("/{id}", put(task::update_task).delete(task::delete_task))
}
