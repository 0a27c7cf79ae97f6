//! Repository for the `wallet_transactions` ledger and the reward spin.

use fitback_core::reward::{can_afford, tier_for_balance, SpinTier};
use fitback_core::types::DbId;
use fitback_core::wallet::{self, LedgerDirection, LedgerKind};
use sqlx::{PgExecutor, PgPool};

use crate::models::wallet::{SpinOutcome, WalletTransaction};

const COLUMNS: &str = "id, user_id, feedback_id, kind, direction, amount, created_at, updated_at";

pub struct WalletRepo;

impl WalletRepo {
    /// Ledger entries of a user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<WalletTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM wallet_transactions
             WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, WalletTransaction>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Sum of credits minus sum of debits.
    pub async fn available_balance<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT direction, amount FROM wallet_transactions WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(executor)
                .await?;
        let entries = rows
            .into_iter()
            .map(|(direction, amount)| {
                direction
                    .parse::<LedgerDirection>()
                    .map(|direction| (direction, amount))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(wallet::available_balance(entries))
    }

    /// Append one ledger entry. The direction follows from `kind`.
    pub async fn record<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
        feedback_id: Option<DbId>,
        kind: LedgerKind,
        amount: i64,
    ) -> Result<WalletTransaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO wallet_transactions (user_id, feedback_id, kind, direction, amount)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WalletTransaction>(&query)
            .bind(user_id)
            .bind(feedback_id)
            .bind(kind.as_str())
            .bind(kind.direction().as_str())
            .bind(amount)
            .fetch_one(executor)
            .await
    }

    /// Pay for one spin and record its reward.
    ///
    /// The user row is locked for the whole transaction so concurrent spins
    /// serialize and the balance check cannot be raced into an overdraft.
    /// `draw` picks the reward amount for the active tier.
    pub async fn spin(
        pool: &PgPool,
        user_id: DbId,
        draw: impl FnOnce(&SpinTier) -> i64,
    ) -> Result<SpinOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        let balance = Self::available_balance(&mut *tx, user_id).await?;
        let tier = tier_for_balance(balance);
        if !can_afford(balance) {
            return Ok(SpinOutcome::InsufficientBalance {
                balance,
                cost: tier.cost,
            });
        }

        let reward = draw(tier);
        Self::record(&mut *tx, user_id, None, LedgerKind::SpinCost, tier.cost).await?;
        if reward > 0 {
            Self::record(&mut *tx, user_id, None, LedgerKind::SpinReward, reward).await?;
        }

        tx.commit().await?;
        Ok(SpinOutcome::Spun {
            tier,
            reward,
            balance_after: balance - tier.cost + reward,
        })
    }
}
