//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /signup               -> signup
/// POST /verify-email         -> verify_email
/// POST /resend-verification  -> resend_verification
/// POST /signin               -> signin
/// POST /signout              -> signout
/// POST /forgot-password      -> forgot_password
/// POST /reset-password       -> reset_password
/// GET  /session              -> get_session
/// POST /session/extend       -> extend_session (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/verify-email", post(auth::verify_email))
        .route("/resend-verification", post(auth::resend_verification))
        .route("/signin", post(auth::signin))
        .route("/signout", post(auth::signout))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .route("/session", get(auth::get_session))
        .route("/session/extend", post(auth::extend_session))
}
