//! Administrator access control.
//!
//! There is exactly one privileged capability: an administrator is a user
//! with the admin flag who is not blocked. Blocked users never get this far
//! because [`AuthUser`] already rejects them.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fitback_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires an administrator. Rejects with 403 "Admin access required".
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(AppError::Core(CoreError::admin_required()));
        }
        Ok(RequireAdmin(user))
    }
}
