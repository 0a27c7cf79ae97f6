pub mod admin;
pub mod auth;
pub mod feedback;
pub mod profile;
pub mod reward;
pub mod wallet;
