//! Server-side session lifecycle: create, validate, extend, delete.
//!
//! Tokens are opaque 48-character strings handed to the client once; only
//! their SHA-256 digest is stored. Validation is the single place that
//! enforces expiry, and it deletes an expired row as it observes it.

use chrono::Utc;
use fitback_core::session::{expiry_from, is_expired};
use fitback_core::tokens::{generate_token, hash_token, is_well_formed};
use fitback_core::types::{DbId, Timestamp};
use fitback_db::models::session::{CreateSession, SessionWithUser, UserSession};
use fitback_db::repositories::SessionRepo;
use sqlx::PgPool;

/// A newly created session. `token` is the only copy of the plaintext.
#[derive(Debug)]
pub struct IssuedSession {
    pub token: String,
    pub session: UserSession,
}

/// Result of looking a presented token up.
#[derive(Debug)]
pub enum SessionCheck {
    Valid(SessionWithUser),
    NotFound,
    /// The row existed but had expired; it has been deleted.
    Expired,
}

impl SessionCheck {
    /// Client-facing reason for a failed check.
    pub fn failure_reason(&self) -> Option<&'static str> {
        match self {
            SessionCheck::Valid(_) => None,
            SessionCheck::NotFound => Some("Session not found"),
            SessionCheck::Expired => Some("Session expired"),
        }
    }
}

/// Create a session for `user_id` expiring 30 days from now.
pub async fn create(pool: &PgPool, user_id: DbId) -> Result<IssuedSession, sqlx::Error> {
    create_at(pool, user_id, Utc::now()).await
}

pub async fn create_at(
    pool: &PgPool,
    user_id: DbId,
    now: Timestamp,
) -> Result<IssuedSession, sqlx::Error> {
    let token = generate_token();
    let session = SessionRepo::create(
        pool,
        &CreateSession {
            user_id,
            token_hash: token.hash,
            expires_at: expiry_from(now),
            last_activity: now,
        },
    )
    .await?;
    Ok(IssuedSession {
        token: token.plaintext,
        session,
    })
}

/// Look up a presented token.
pub async fn validate(pool: &PgPool, token: &str) -> Result<SessionCheck, sqlx::Error> {
    validate_at(pool, token, Utc::now()).await
}

pub async fn validate_at(
    pool: &PgPool,
    token: &str,
    now: Timestamp,
) -> Result<SessionCheck, sqlx::Error> {
    if !is_well_formed(token) {
        return Ok(SessionCheck::NotFound);
    }
    let token_hash = hash_token(token);
    let Some(session) = SessionRepo::find_with_user(pool, &token_hash).await? else {
        return Ok(SessionCheck::NotFound);
    };
    if is_expired(session.expires_at, now) {
        SessionRepo::delete_by_token_hash(pool, &token_hash).await?;
        tracing::debug!(session_id = session.session_id, "Deleted expired session");
        return Ok(SessionCheck::Expired);
    }
    Ok(SessionCheck::Valid(session))
}

/// Push expiry to 30 days from now. Not throttled; callers decide when.
///
/// Returns `None` when the session no longer exists.
pub async fn extend(pool: &PgPool, token: &str) -> Result<Option<UserSession>, sqlx::Error> {
    extend_at(pool, token, Utc::now()).await
}

pub async fn extend_at(
    pool: &PgPool,
    token: &str,
    now: Timestamp,
) -> Result<Option<UserSession>, sqlx::Error> {
    SessionRepo::extend(pool, &hash_token(token), expiry_from(now), now).await
}

/// Delete the session behind `token`. Returns `true` if one existed.
pub async fn delete(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
    SessionRepo::delete_by_token_hash(pool, &hash_token(token)).await
}

/// Delete every session of a user.
pub async fn delete_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
    SessionRepo::delete_all_for_user(pool, user_id).await
}

/// Bulk-delete every expired session.
pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
    SessionRepo::cleanup_expired(pool, Utc::now()).await
}
