//! Repository for the `feedbacks` table.

use fitback_core::feedback::FeedbackStatus;
use fitback_core::types::{DbId, Timestamp};
use fitback_core::wallet::pending_balance;
use sqlx::{PgConnection, PgPool};

use crate::models::feedback::{CreateFeedback, Feedback, FeedbackQueueItem, UpdateFeedback};
use crate::repositories::ProfileRepo;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, user_id, product_url, brand, size, fit_score, kept_status, \
                                  status, is_final, original_feedback_id, cashback_amount, \
                                  created_at, updated_at";

/// Same columns, qualified for joins against `users`.
const QUALIFIED_COLUMNS: &str = "f.id, f.user_id, f.product_url, f.brand, f.size, f.fit_score, \
                                 f.kept_status, f.status, f.is_final, f.original_feedback_id, \
                                 f.cashback_amount, f.created_at, f.updated_at";

pub struct FeedbackRepo;

impl FeedbackRepo {
    /// Insert a new `pending` submission.
    ///
    /// The owner's profile row is provisioned in the same transaction if it
    /// does not exist yet.
    pub async fn create(pool: &PgPool, input: &CreateFeedback) -> Result<Feedback, sqlx::Error> {
        let mut tx = pool.begin().await?;

        ProfileRepo::ensure(&mut *tx, input.user_id).await?;

        let query = format!(
            "INSERT INTO feedbacks
                (user_id, product_url, brand, size, fit_score, kept_status, status,
                 is_final, cashback_amount)
             VALUES ($1, $2, $3, $4, $5, $6, $7, true, $8)
             RETURNING {COLUMNS}"
        );
        let feedback = sqlx::query_as::<_, Feedback>(&query)
            .bind(input.user_id)
            .bind(&input.product_url)
            .bind(&input.brand)
            .bind(&input.size)
            .bind(input.fit_score)
            .bind(input.kept_status.as_str())
            .bind(FeedbackStatus::Pending.as_str())
            .bind(input.cashback_amount)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(feedback)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Feedback>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feedbacks WHERE id = $1");
        sqlx::query_as::<_, Feedback>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load and row-lock a feedback inside an open transaction.
    pub(crate) async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Feedback>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feedbacks WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Feedback>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// A user's submissions, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Feedback>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM feedbacks WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Feedback>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Review queue, oldest first so submissions are handled in arrival order.
    pub async fn list_queue(
        pool: &PgPool,
        status: Option<FeedbackStatus>,
    ) -> Result<Vec<FeedbackQueueItem>, sqlx::Error> {
        let query = format!(
            "SELECT {QUALIFIED_COLUMNS},
                    u.email AS user_email,
                    u.name AS user_name,
                    (SELECT COUNT(*) FROM videos v WHERE v.feedback_id = f.id) AS video_count
             FROM feedbacks f
             JOIN users u ON u.id = f.user_id
             WHERE ($1::TEXT IS NULL OR f.status = $1)
             ORDER BY f.created_at ASC, f.id ASC"
        );
        sqlx::query_as::<_, FeedbackQueueItem>(&query)
            .bind(status.map(FeedbackStatus::as_str))
            .fetch_all(pool)
            .await
    }

    /// Apply an owner edit.
    ///
    /// The update is guarded on ownership, an editable status and
    /// `created_at > edit_cutoff`; `None` means the guard rejected it.
    pub async fn update_by_owner(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        edit_cutoff: Timestamp,
        input: &UpdateFeedback,
    ) -> Result<Option<Feedback>, sqlx::Error> {
        let query = format!(
            "UPDATE feedbacks SET
                product_url = COALESCE($4, product_url),
                brand = COALESCE($5, brand),
                size = COALESCE($6, size),
                fit_score = COALESCE($7, fit_score),
                kept_status = COALESCE($8, kept_status)
             WHERE id = $1 AND user_id = $2
               AND status IN ('pending', 'submitted')
               AND created_at > $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Feedback>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(edit_cutoff)
            .bind(&input.product_url)
            .bind(&input.brand)
            .bind(&input.size)
            .bind(input.fit_score)
            .bind(input.kept_status.map(|k| k.as_str()))
            .fetch_optional(pool)
            .await
    }

    /// Move a `pending`/`submitted` feedback to `under_review`.
    ///
    /// Returns `None` when the feedback is missing or already past that point.
    pub async fn advance_to_under_review(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Feedback>, sqlx::Error> {
        let query = format!(
            "UPDATE feedbacks SET status = 'under_review'
             WHERE id = $1 AND status IN ('pending', 'submitted')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Feedback>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Cashback of the user's feedbacks that are still awaiting a decision.
    pub async fn pending_cashback(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, cashback_amount FROM feedbacks WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(pool)
                .await?;
        let feedbacks = rows
            .into_iter()
            .map(|(status, cashback)| {
                status
                    .parse::<FeedbackStatus>()
                    .map(|status| (status, cashback))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(pending_balance(feedbacks))
    }
}
