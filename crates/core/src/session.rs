//! Session lifetime policy and the client-side session store.
//!
//! The server-side primitives (create, validate, extend, delete) live in the
//! API crate; this module owns the time arithmetic they share so it can be
//! tested without a clock or a database.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Sessions live for 30 days from creation or last extension.
pub const SESSION_TTL_DAYS: i64 = 30;

/// Renewal is attempted at most once per 24 hours of wall-clock time.
pub const RENEWAL_THROTTLE_HOURS: i64 = 24;

/// Cookie carrying the opaque session token.
pub const SESSION_COOKIE_NAME: &str = "fitback_session_id";

/// Header alternative to the cookie for non-browser clients.
pub const SESSION_HEADER_NAME: &str = "x-session-id";

/// Session lifetime as a `chrono` duration.
pub fn session_ttl() -> chrono::Duration {
    chrono::Duration::days(SESSION_TTL_DAYS)
}

/// Expiry timestamp for a session created or extended at `now`.
pub fn expiry_from(now: Timestamp) -> Timestamp {
    now + session_ttl()
}

/// A session is dead once `now` is strictly past its expiry.
pub fn is_expired(expires_at: Timestamp, now: Timestamp) -> bool {
    now > expires_at
}

/// Whether enough time has passed since the last renewal to renew again.
pub fn renewal_due(last_activity: Timestamp, now: Timestamp) -> bool {
    now - last_activity >= chrono::Duration::hours(RENEWAL_THROTTLE_HOURS)
}

/// Public identity attached to a validated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub id: DbId,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
    pub email_verified: bool,
}

#[derive(Debug, Clone)]
struct CachedSession {
    token: String,
    user: SessionIdentity,
    expires_at: Timestamp,
    last_extended_at: Timestamp,
}

/// Client-side holder of the current session.
///
/// One instance lives for the lifetime of a client. It is the single source
/// of truth for "who is signed in" on that client and is invalidated only by
/// [`SessionStore::sign_out`] or by observing expiry.
#[derive(Debug, Default)]
pub struct SessionStore {
    current: Option<CachedSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful sign-in or email verification.
    pub fn sign_in(
        &mut self,
        token: String,
        user: SessionIdentity,
        expires_at: Timestamp,
        now: Timestamp,
    ) {
        self.current = Some(CachedSession {
            token,
            user,
            expires_at,
            last_extended_at: now,
        });
    }

    /// The signed-in user, clearing the store if the session has expired.
    pub fn current_user(&mut self, now: Timestamp) -> Option<&SessionIdentity> {
        self.evict_if_expired(now);
        self.current.as_ref().map(|s| &s.user)
    }

    /// The token to present on requests, if still live.
    pub fn token(&mut self, now: Timestamp) -> Option<&str> {
        self.evict_if_expired(now);
        self.current.as_ref().map(|s| s.token.as_str())
    }

    /// Whether the client should call the extend endpoint now.
    pub fn needs_extension(&self, now: Timestamp) -> bool {
        self.current
            .as_ref()
            .is_some_and(|s| !is_expired(s.expires_at, now) && renewal_due(s.last_extended_at, now))
    }

    /// Record a server-confirmed extension.
    pub fn mark_extended(&mut self, expires_at: Timestamp, now: Timestamp) {
        if let Some(session) = self.current.as_mut() {
            session.expires_at = expires_at;
            session.last_extended_at = now;
        }
    }

    /// Drop the session after an explicit sign-out or a 401 from the server.
    pub fn sign_out(&mut self) {
        self.current = None;
    }

    fn evict_if_expired(&mut self, now: Timestamp) {
        if self
            .current
            .as_ref()
            .is_some_and(|s| is_expired(s.expires_at, now))
        {
            self.current = None;
        }
    }
}
