//! Shared domain types for the taskboard workspace.
//!
//! Nothing in this crate touches the network or the database; the server and
//! the client both depend on it.

pub mod deadline;
pub mod error;
pub mod types;
