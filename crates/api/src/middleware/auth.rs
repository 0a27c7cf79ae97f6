//! Session-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fitback_core::error::CoreError;
use fitback_core::session::SessionIdentity;
use fitback_core::types::{DbId, Timestamp};

use crate::auth::cookie::token_from_headers;
use crate::auth::session::{self, SessionCheck};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user resolved from a live session.
///
/// Every failure (no token, unknown token, expired session, blocked account)
/// rejects with the same generic 401.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub email: String,
    pub name: String,
    /// Administrator capability, see [`fitback_core::roles::is_administrator`].
    pub is_admin: bool,
    pub email_verified: bool,
    /// Plaintext token presented with this request.
    pub token: String,
    pub expires_at: Timestamp,
    pub last_activity: Timestamp,
}

impl AuthUser {
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

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers)
            .ok_or_else(|| AppError::Core(CoreError::unauthorized()))?;

        let found = match session::validate(&state.pool, &token).await? {
            SessionCheck::Valid(found) => found,
            other => {
                tracing::debug!(reason = ?other.failure_reason(), "Session rejected");
                return Err(AppError::Core(CoreError::unauthorized()));
            }
        };

        if found.is_blocked {
            tracing::debug!(user_id = found.user_id, "Blocked user presented a session");
            return Err(AppError::Core(CoreError::unauthorized()));
        }

        let is_admin = found.is_administrator();
        Ok(AuthUser {
            user_id: found.user_id,
            email: found.email,
            name: found.name,
            is_admin,
            email_verified: found.email_verified,
            token,
            expires_at: found.expires_at,
            last_activity: found.last_activity,
        })
    }
}
