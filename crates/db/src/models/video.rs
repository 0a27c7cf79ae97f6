//! Video references attached to feedback. The bytes live in object storage.

use fitback_core::feedback::FeedbackStatus;
use fitback_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::feedback::Feedback;

/// A row from the `videos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: DbId,
    pub feedback_id: DbId,
    pub storage_path: String,
    pub format: String,
    pub video_type: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateVideo {
    pub feedback_id: DbId,
    pub storage_path: String,
    pub format: String,
    pub video_type: String,
}

/// Result of attaching a video.
#[derive(Debug, Clone)]
pub enum VideoAttachOutcome {
    Attached { video: Video, feedback: Feedback },
    /// Terminal feedback no longer accepts videos.
    Closed(FeedbackStatus),
    NotFound,
}
