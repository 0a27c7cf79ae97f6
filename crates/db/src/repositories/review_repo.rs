//! Administrator decisions on feedback and the `admin_reviews` audit trail.

use fitback_core::feedback::{plan_review, ReviewAction, ReviewPlan};
use fitback_core::types::DbId;
use fitback_core::wallet::LedgerKind;
use sqlx::PgPool;

use crate::models::feedback::Feedback;
use crate::models::review::{AdminReview, ReviewOutcome};
use crate::repositories::feedback_repo::{self, FeedbackRepo};

const COLUMNS: &str = "id, feedback_id, reviewer_id, decision, notes, created_at, updated_at";

pub struct ReviewRepo;

impl ReviewRepo {
    /// Apply an approve or reject decision.
    ///
    /// Runs in one transaction with the feedback row locked: the guarded
    /// status update, the cashback credit (approve only) and the audit row
    /// either all land or none do. Repeating a decision writes nothing.
    pub async fn decide(
        pool: &PgPool,
        feedback_id: DbId,
        reviewer_id: DbId,
        action: ReviewAction,
        notes: Option<&str>,
    ) -> Result<ReviewOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(feedback) = FeedbackRepo::find_for_update(&mut *tx, feedback_id).await? else {
            return Ok(ReviewOutcome::NotFound);
        };
        let current = feedback
            .current_status()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        match plan_review(current, action) {
            Ok(ReviewPlan::Apply) => {}
            Ok(ReviewPlan::AlreadyApplied) => return Ok(ReviewOutcome::AlreadyProcessed(feedback)),
            Err(_) => return Ok(ReviewOutcome::Conflict(current)),
        }

        let query = format!(
            "UPDATE feedbacks SET status = $2
             WHERE id = $1 AND status IN ('pending', 'submitted', 'under_review')
             RETURNING {}",
            feedback_repo::COLUMNS
        );
        let updated = sqlx::query_as::<_, Feedback>(&query)
            .bind(feedback_id)
            .bind(action.target_status().as_str())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(updated) = updated else {
            // Lost a race with another reviewer.
            return Ok(ReviewOutcome::Conflict(current));
        };

        if action == ReviewAction::Approve && updated.cashback_amount > 0 {
            let kind = LedgerKind::Cashback;
            sqlx::query(
                "INSERT INTO wallet_transactions (user_id, feedback_id, kind, direction, amount)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (feedback_id) WHERE kind = 'cashback' DO NOTHING",
            )
            .bind(updated.user_id)
            .bind(updated.id)
            .bind(kind.as_str())
            .bind(kind.direction().as_str())
            .bind(updated.cashback_amount)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT INTO admin_reviews (feedback_id, reviewer_id, decision, notes)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(feedback_id)
        .bind(reviewer_id)
        .bind(action.decision())
        .bind(notes)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            feedback_id,
            reviewer_id,
            decision = action.decision(),
            "Feedback review applied",
        );
        Ok(ReviewOutcome::Applied(updated))
    }

    /// Audit trail for a feedback, oldest first.
    pub async fn list_for_feedback(
        pool: &PgPool,
        feedback_id: DbId,
    ) -> Result<Vec<AdminReview>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM admin_reviews WHERE feedback_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, AdminReview>(&query)
            .bind(feedback_id)
            .fetch_all(pool)
            .await
    }
}
