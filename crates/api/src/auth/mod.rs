//! Authentication primitives: password hashing, session lifecycle and the
//! session cookie.

pub mod cookie;
pub mod password;
pub mod session;
