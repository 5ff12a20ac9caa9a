//! Authentication extractors.
//!
//! - [`auth::AuthUser`] -- the caller verified from a Bearer access token.

pub mod auth;
