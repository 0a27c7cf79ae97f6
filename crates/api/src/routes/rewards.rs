use axum::routing::get;
use axum::Router;

use crate::handlers::reward;
use crate::state::AppState;

/// Routes mounted at `/rewards`.
///
/// ```text
/// GET  /spin  -> spin_status
/// POST /spin  -> spin
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/spin", get(reward::spin_status).post(reward::spin))
}
