//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row and the input DTOs its repository accepts.

pub mod auth_token;
pub mod feedback;
pub mod profile;
pub mod review;
pub mod session;
pub mod user;
pub mod video;
pub mod wallet;
