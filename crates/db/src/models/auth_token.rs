//! Single-use email verification and password reset tokens.

use fitback_core::tokens::TokenPurpose;
use fitback_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `auth_tokens` table.
#[derive(Debug, Clone, FromRow)]
pub struct AuthToken {
    pub id: DbId,
    pub user_id: DbId,
    pub purpose: String,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub struct CreateAuthToken {
    pub user_id: DbId,
    pub purpose: TokenPurpose,
    pub token_hash: String,
    pub expires_at: Timestamp,
}
