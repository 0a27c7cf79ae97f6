use axum::routing::get;
use axum::Router;

use crate::handlers::wallet;
use crate::state::AppState;

/// Routes mounted at `/wallet`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(wallet::get_wallet))
}
