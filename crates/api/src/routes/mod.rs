pub mod admin;
pub mod auth;
pub mod feedback;
pub mod health;
pub mod profile;
pub mod rewards;
pub mod wallet;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                          create account (public)
/// /auth/verify-email                    verify + sign in (public)
/// /auth/resend-verification             resend link (public)
/// /auth/signin                          sign in (public)
/// /auth/signout                         sign out
/// /auth/forgot-password                 request reset link (public)
/// /auth/reset-password                  set new password (public)
/// /auth/session                         current user, renews when due
/// /auth/session/extend                  explicit renewal (POST)
///
/// /profile                              get, replace (GET, PUT)
///
/// /feedback                             list own, submit (GET, POST)
/// /feedback/{id}                        get, edit (GET, PATCH)
/// /feedback/{id}/video                  attach video (POST)
/// /feedback/{id}/video/validate         validate sampled frames (POST)
///
/// /wallet                               balances + ledger (GET)
/// /rewards/spin                         active tier, spin (GET, POST)
///
/// /admin/feedback                       review queue, ?status= (GET)
/// /admin/feedback/review                approve / reject (POST)
/// /admin/feedback/{id}/reviews          audit trail (GET)
/// /admin/users                          list (GET)
/// /admin/users/{id}/block               block + revoke sessions (POST)
/// /admin/users/{id}/unblock             unblock (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/feedback", feedback::router())
        .nest("/wallet", wallet::router())
        .nest("/rewards", rewards::router())
        .nest("/admin", admin::router())
}
