//! Repository for the `auth_tokens` table.

use fitback_core::tokens::TokenPurpose;
use fitback_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::auth_token::{AuthToken, CreateAuthToken};

const COLUMNS: &str = "id, user_id, purpose, token_hash, expires_at, used_at, created_at, updated_at";

pub struct AuthTokenRepo;

impl AuthTokenRepo {
    /// Issue a token, retiring any unused token of the same purpose first
    /// so only the latest emailed link works.
    pub async fn issue(pool: &PgPool, input: &CreateAuthToken) -> Result<AuthToken, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE auth_tokens SET used_at = NOW()
             WHERE user_id = $1 AND purpose = $2 AND used_at IS NULL",
        )
        .bind(input.user_id)
        .bind(input.purpose.as_str())
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO auth_tokens (user_id, purpose, token_hash, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let token = sqlx::query_as::<_, AuthToken>(&query)
            .bind(input.user_id)
            .bind(input.purpose.as_str())
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(token)
    }

    /// Atomically mark a token used if it is unused and unexpired.
    ///
    /// Returns `None` for unknown, spent, expired or wrong-purpose tokens.
    pub async fn consume(
        pool: &PgPool,
        purpose: TokenPurpose,
        token_hash: &str,
        now: Timestamp,
    ) -> Result<Option<AuthToken>, sqlx::Error> {
        let query = format!(
            "UPDATE auth_tokens SET used_at = $3
             WHERE token_hash = $1 AND purpose = $2 AND used_at IS NULL AND expires_at > $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuthToken>(&query)
            .bind(token_hash)
            .bind(purpose.as_str())
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Delete tokens that are spent or past expiry.
    pub async fn cleanup(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE used_at IS NOT NULL OR expires_at < $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
