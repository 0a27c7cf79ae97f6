//! Handler for the caller's wallet.

use axum::extract::State;
use axum::Json;
use fitback_db::models::wallet::WalletTransaction;
use fitback_db::repositories::{FeedbackRepo, WalletRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Balances are recomputed from the ledger on every read.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletView {
    /// Credits minus debits.
    pub available: i64,
    /// Cashback of submissions still awaiting a decision.
    pub pending: i64,
    pub transactions: Vec<WalletTransaction>,
}

/// GET /api/v1/wallet
pub async fn get_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<WalletView>>> {
    let available = WalletRepo::available_balance(&state.pool, auth.user_id).await?;
    let pending = FeedbackRepo::pending_cashback(&state.pool, auth.user_id).await?;
    let transactions = WalletRepo::list_for_user(&state.pool, auth.user_id).await?;

    Ok(Json(DataResponse {
        data: WalletView {
            available,
            pending,
            transactions,
        },
    }))
}
