//! Route definitions for the `/feedback` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::feedback;
use crate::state::AppState;

/// Routes mounted at `/feedback`.
///
/// ```text
/// GET   /                       -> list_feedback
/// POST  /                       -> create_feedback
/// GET   /{id}                   -> get_feedback
/// PATCH /{id}                   -> update_feedback
/// POST  /{id}/video             -> attach_video
/// POST  /{id}/video/validate    -> validate_video
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(feedback::list_feedback).post(feedback::create_feedback),
        )
        .route(
            "/{id}",
            get(feedback::get_feedback).patch(feedback::update_feedback),
        )
        .route("/{id}/video", post(feedback::attach_video))
        .route("/{id}/video/validate", post(feedback::validate_video))
}
