//! Administrator capability.
//!
//! There is exactly one authorization question in the system: may this user
//! act as an administrator? The `ADMIN_EMAILS` allow-list is only seed data
//! for the `users.is_admin` flag and is never consulted per request.

/// Whether a user may perform administrator actions.
pub fn is_administrator(is_admin: bool, is_blocked: bool) -> bool {
    is_admin && !is_blocked
}

/// Parse a comma-separated allow-list of administrator emails.
///
/// Entries are trimmed and lower-cased; blanks are dropped.
pub fn parse_admin_allow_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
