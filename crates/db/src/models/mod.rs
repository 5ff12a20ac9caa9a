pub mod session;
pub mod task;
pub mod task_list;
pub mod user;
