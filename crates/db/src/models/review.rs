//! Administrator review audit trail.

use fitback_core::feedback::FeedbackStatus;
use fitback_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::feedback::Feedback;

/// A row from the append-only `admin_reviews` table.
///
/// `feedbacks.status` is authoritative; these rows only record history.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminReview {
    pub id: DbId,
    pub feedback_id: DbId,
    pub reviewer_id: DbId,
    pub decision: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Result of applying a review decision.
#[derive(Debug, Clone)]
pub enum ReviewOutcome {
    /// Status changed; side effects were written in the same transaction.
    Applied(Feedback),
    /// The same decision was already in place; nothing was written.
    AlreadyProcessed(Feedback),
    /// The feedback holds the opposite terminal decision.
    Conflict(FeedbackStatus),
    NotFound,
}
