//! Handlers for the reward spin.
//!
//! The tier, and therefore the cost and prize table, is picked from the
//! caller's available balance at the moment of the spin.

use axum::extract::State;
use axum::Json;
use fitback_core::error::CoreError;
use fitback_core::reward::{can_afford, draw, tier_for_balance, RewardOption, SpinTier};
use fitback_db::models::wallet::SpinOutcome;
use fitback_db::repositories::WalletRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, SuccessResponse};
use crate::state::AppState;

/// Public view of a spin tier. Odds are given as weights out of `totalWeight`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierView {
    pub name: &'static str,
    pub cost: i64,
    pub min_balance: i64,
    pub max_balance: Option<i64>,
    pub rewards: &'static [RewardOption],
    pub total_weight: u32,
}

impl From<&'static SpinTier> for TierView {
    fn from(tier: &'static SpinTier) -> Self {
        Self {
            name: tier.name,
            cost: tier.cost,
            min_balance: tier.min_balance,
            max_balance: tier.max_balance,
            rewards: tier.rewards,
            total_weight: tier.total_weight(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinStatus {
    pub balance: i64,
    pub can_spin: bool,
    pub tier: TierView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinResult {
    pub tier: &'static str,
    pub cost: i64,
    pub reward: i64,
    pub balance: i64,
}

/// GET /api/v1/rewards/spin
pub async fn spin_status(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<SpinStatus>>> {
    let balance = WalletRepo::available_balance(&state.pool, auth.user_id).await?;
    let tier = tier_for_balance(balance);
    Ok(Json(DataResponse {
        data: SpinStatus {
            balance,
            can_spin: can_afford(balance),
            tier: TierView::from(tier),
        },
    }))
}

/// POST /api/v1/rewards/spin
///
/// Debit the tier cost and credit a weighted-random reward, atomically.
pub async fn spin(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<SuccessResponse<SpinResult>>> {
    let outcome =
        WalletRepo::spin(&state.pool, auth.user_id, |tier| draw(tier, &mut rand::rng())).await?;

    match outcome {
        SpinOutcome::Spun {
            tier,
            reward,
            balance_after,
        } => {
            tracing::info!(
                user_id = auth.user_id,
                tier = tier.name,
                cost = tier.cost,
                reward,
                "Reward spin",
            );
            Ok(Json(SuccessResponse::new(SpinResult {
                tier: tier.name,
                cost: tier.cost,
                reward,
                balance: balance_after,
            })))
        }
        SpinOutcome::InsufficientBalance { balance, cost } => {
            tracing::debug!(user_id = auth.user_id, balance, cost, "Spin refused");
            Err(AppError::Core(CoreError::Conflict(
                "Insufficient balance".into(),
            )))
        }
    }
}
