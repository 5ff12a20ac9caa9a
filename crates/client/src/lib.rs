//! Client side of the taskboard API.
//!
//! - [`token_store`] -- where the access/refresh pair lives between calls.
//! - [`gateway::ApiClient`] -- every HTTP call, the 401 refresh protocol, and
//!   the typed task/list operations.
//! - [`guard::RouteGuard`] -- which surface to show on navigation.
//! - [`timer::DeadlineTimer`] -- live countdown for a task's deadline.
//!
//! Notifications and redirects are never performed inline; they are
//! published as [`events::ClientEvent`]s for the embedding UI to act on.

pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod guard;
pub mod models;
pub mod timer;
pub mod token_store;

pub use error::ClientError;
pub use gateway::{ApiClient, RefreshPolicy};
