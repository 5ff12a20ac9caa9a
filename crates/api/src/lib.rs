//! Taskboard API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! background jobs) so integration tests, the client crate's tests, and the
//! binary entrypoint can all access them.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
