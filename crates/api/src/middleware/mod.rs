//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Resolves the caller from the session cookie or `x-session-id` header.
//! - [`rbac::RequireAdmin`] -- Requires an unblocked administrator.

pub mod auth;
pub mod rbac;
