//! Static repositories, one per table. Each takes a `&PgPool`.

pub mod session_repo;
pub mod task_list_repo;
pub mod task_repo;
pub mod user_repo;

pub use session_repo::SessionRepo;
pub use task_list_repo::TaskListRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
