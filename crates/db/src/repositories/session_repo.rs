//! Repository for the `user_sessions` table.

use fitback_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::session::{CreateSession, SessionWithUser, UserSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_hash, expires_at, last_activity, created_at, updated_at";

/// Provides CRUD operations for user sessions.
///
/// Every lookup is keyed on the SHA-256 hash of the opaque token; the
/// plaintext never reaches this layer.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, token_hash, expires_at, last_activity)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .bind(input.last_activity)
            .fetch_one(pool)
            .await
    }

    /// Find a session by token hash, joined with its owner's public fields.
    ///
    /// Expired rows are returned as-is; the caller decides what to do with them.
    pub async fn find_with_user(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<SessionWithUser>, sqlx::Error> {
        sqlx::query_as::<_, SessionWithUser>(
            "SELECT s.id AS session_id, s.user_id, s.expires_at, s.last_activity,
                    u.email, u.name, u.email_verified, u.is_admin, u.is_blocked
             FROM user_sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await
    }

    /// Push the expiry out and record activity. Returns `None` when the
    /// session no longer exists.
    pub async fn extend(
        pool: &PgPool,
        token_hash: &str,
        expires_at: Timestamp,
        now: Timestamp,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "UPDATE user_sessions SET expires_at = $2, last_activity = $3
             WHERE token_hash = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(token_hash)
            .bind(expires_at)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Delete a single session by token hash. Returns `true` if a row was removed.
    pub async fn delete_by_token_hash(pool: &PgPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every session of a user. Returns the count of deleted rows.
    pub async fn delete_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions whose expiry is before `now`. Returns the count of deleted rows.
    pub async fn cleanup_expired(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at < $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Number of live rows for a user, expired or not.
    pub async fn count_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
