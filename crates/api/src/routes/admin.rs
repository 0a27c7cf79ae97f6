//! Route definitions for `/admin`. Every handler requires an administrator.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET  /feedback                 -> list_queue
/// POST /feedback/review          -> review_feedback
/// GET  /feedback/{id}/reviews    -> list_reviews
/// GET  /users                    -> list_users
/// POST /users/{id}/block         -> block_user
/// POST /users/{id}/unblock       -> unblock_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feedback", get(admin::list_queue))
        .route("/feedback/review", post(admin::review_feedback))
        .route("/feedback/{id}/reviews", get(admin::list_reviews))
        .route("/users", get(admin::list_users))
        .route("/users/{id}/block", post(admin::block_user))
        .route("/users/{id}/unblock", post(admin::unblock_user))
}
