//! Feedback submission model and DTOs.

use fitback_core::error::CoreError;
use fitback_core::feedback::{FeedbackStatus, KeptStatus};
use fitback_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `feedbacks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: DbId,
    pub user_id: DbId,
    pub product_url: String,
    pub brand: String,
    pub size: String,
    pub fit_score: i16,
    pub kept_status: String,
    pub status: String,
    pub is_final: bool,
    pub original_feedback_id: Option<DbId>,
    pub cashback_amount: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Feedback {
    /// Typed view of `status`. The column is CHECK-constrained, so a parse
    /// failure means the schema and the code disagree.
    pub fn current_status(&self) -> Result<FeedbackStatus, CoreError> {
        self.status.parse()
    }
}

/// DTO for inserting a new submission. New rows start as `pending`.
#[derive(Debug, Clone)]
pub struct CreateFeedback {
    pub user_id: DbId,
    pub product_url: String,
    pub brand: String,
    pub size: String,
    pub fit_score: i16,
    pub kept_status: KeptStatus,
    pub cashback_amount: i64,
}

/// Owner edit. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateFeedback {
    pub product_url: Option<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub fit_score: Option<i16>,
    pub kept_status: Option<KeptStatus>,
}

/// Admin queue entry: the feedback plus who submitted it.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackQueueItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub feedback: Feedback,
    pub user_email: String,
    pub user_name: String,
    pub video_count: i64,
}
