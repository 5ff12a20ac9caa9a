pub mod auth;
pub mod task;
pub mod task_list;
