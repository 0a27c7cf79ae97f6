//! Wallet ledger entries.

use fitback_core::reward::SpinTier;
use fitback_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the append-only `wallet_transactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    pub id: DbId,
    pub user_id: DbId,
    pub feedback_id: Option<DbId>,
    pub kind: String,
    pub direction: String,
    pub amount: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Result of a spin attempt.
#[derive(Debug, Clone)]
pub enum SpinOutcome {
    /// The cost was debited and `reward` (possibly 0) credited.
    Spun {
        tier: &'static SpinTier,
        reward: i64,
        balance_after: i64,
    },
    /// Balance below the active tier's cost; nothing was written.
    InsufficientBalance { balance: i64, cost: i64 },
}
