//! User session model and DTOs.

use fitback_core::roles::is_administrator;
use fitback_core::session::SessionIdentity;
use fitback_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A session row from the `user_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub last_activity: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new session.
pub struct CreateSession {
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub last_activity: Timestamp,
}

/// Session joined with the public fields of its owner.
#[derive(Debug, Clone, FromRow)]
pub struct SessionWithUser {
    pub session_id: DbId,
    pub user_id: DbId,
    pub expires_at: Timestamp,
    pub last_activity: Timestamp,
    pub email: String,
    pub name: String,
    pub email_verified: bool,
    pub is_admin: bool,
    pub is_blocked: bool,
}

impl SessionWithUser {
    pub fn is_administrator(&self) -> bool {
        is_administrator(self.is_admin, self.is_blocked)
    }

    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            id: self.user_id,
            email: self.email.clone(),
            name: self.name.clone(),
            is_admin: self.is_admin,
            email_verified: self.email_verified,
        }
    }
}
