//! Fitback domain rules.
//!
//! This crate has no I/O. It holds the pieces shared by the database layer,
//! the HTTP layer and the integration crates: identifier types, the domain
//! error, session policy, the feedback state machine, wallet arithmetic,
//! reward tiers and frame-vote aggregation.

pub mod account;
pub mod error;
pub mod feedback;
pub mod hashing;
pub mod reward;
pub mod roles;
pub mod session;
pub mod tokens;
pub mod types;
pub mod video_validation;
pub mod wallet;
