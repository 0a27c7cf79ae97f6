//! Repository for the `videos` table.

use fitback_core::types::DbId;
use sqlx::PgPool;

use crate::models::feedback::Feedback;
use crate::models::video::{CreateVideo, Video, VideoAttachOutcome};
use crate::repositories::feedback_repo::{self, FeedbackRepo};

const COLUMNS: &str = "id, feedback_id, storage_path, format, video_type, created_at, updated_at";

pub struct VideoRepo;

impl VideoRepo {
    /// Record a video and advance the feedback to `under_review`.
    ///
    /// Both writes share one transaction with the feedback row locked, so a
    /// concurrent review cannot slip between them.
    pub async fn attach(
        pool: &PgPool,
        input: &CreateVideo,
    ) -> Result<VideoAttachOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(feedback) = FeedbackRepo::find_for_update(&mut *tx, input.feedback_id).await?
        else {
            return Ok(VideoAttachOutcome::NotFound);
        };
        let current = feedback
            .current_status()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let next = match current.after_video() {
            Ok(next) => next,
            Err(_) => return Ok(VideoAttachOutcome::Closed(current)),
        };

        let query = format!(
            "INSERT INTO videos (feedback_id, storage_path, format, video_type)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let video = sqlx::query_as::<_, Video>(&query)
            .bind(input.feedback_id)
            .bind(&input.storage_path)
            .bind(&input.format)
            .bind(&input.video_type)
            .fetch_one(&mut *tx)
            .await?;

        let query = format!(
            "UPDATE feedbacks SET status = $2 WHERE id = $1 RETURNING {}",
            feedback_repo::COLUMNS
        );
        let feedback = sqlx::query_as::<_, Feedback>(&query)
            .bind(input.feedback_id)
            .bind(next.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(VideoAttachOutcome::Attached { video, feedback })
    }

    /// Videos of a feedback, oldest first.
    pub async fn list_for_feedback(
        pool: &PgPool,
        feedback_id: DbId,
    ) -> Result<Vec<Video>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM videos WHERE feedback_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(feedback_id)
            .fetch_all(pool)
            .await
    }
}
