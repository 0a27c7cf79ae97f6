//! Handlers for the user-facing `/feedback` resource.
//!
//! Users submit fit feedback, attach the try-on video and may amend the
//! submission within the edit window. Review decisions live in
//! [`crate::handlers::admin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use fitback_core::error::CoreError;
use fitback_core::feedback::{
    check_owner_edit, validate_feedback_patch, validate_new_feedback, validate_video_reference,
    FeedbackInput, FeedbackStatus, DEFAULT_CASHBACK_AMOUNT, EDIT_WINDOW_HOURS,
};
use fitback_core::types::DbId;
use fitback_core::video_validation::{ValidationReport, MAX_VIDEO_FRAMES};
use fitback_db::models::feedback::{CreateFeedback, Feedback, UpdateFeedback};
use fitback_db::models::video::{CreateVideo, Video, VideoAttachOutcome};
use fitback_db::repositories::{FeedbackRepo, VideoRepo};
use fitback_vision::validate_frames;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, SuccessResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedFeedback {
    pub feedback_id: DbId,
}

/// Request body for `POST /feedback/{id}/video`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachVideoRequest {
    pub storage_path: String,
    pub format: String,
    pub video_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedVideo {
    pub video: Video,
    pub status: String,
}

/// Request body for `POST /feedback/{id}/video/validate`.
///
/// Frames are base64 JPEG stills sampled by the client.
#[derive(Debug, Deserialize)]
pub struct ValidateVideoRequest {
    pub frames: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub report: ValidationReport,
    pub status: String,
}

/// Feedback with its attached videos.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDetail {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub videos: Vec<Video>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/feedback
///
/// Validate and store a new submission as `pending`.
pub async fn create_feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<FeedbackInput>,
) -> AppResult<impl IntoResponse> {
    let valid = validate_new_feedback(&input)?;

    let feedback = FeedbackRepo::create(
        &state.pool,
        &CreateFeedback {
            user_id: auth.user_id,
            product_url: valid.product_url,
            brand: valid.brand,
            size: valid.size,
            fit_score: valid.fit_score,
            kept_status: valid.kept_status,
            cashback_amount: DEFAULT_CASHBACK_AMOUNT,
        },
    )
    .await?;

    tracing::info!(user_id = auth.user_id, feedback_id = feedback.id, "Feedback submitted");

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(CreatedFeedback {
            feedback_id: feedback.id,
        })),
    ))
}

/// GET /api/v1/feedback
///
/// The caller's submissions, newest first.
pub async fn list_feedback(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Feedback>>>> {
    let items = FeedbackRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/feedback/{id}
///
/// Visible to the owner and to administrators. Anyone else gets 404.
pub async fn get_feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FeedbackDetail>>> {
    let feedback = find_visible(&state, &auth, id).await?;
    let videos = VideoRepo::list_for_feedback(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: FeedbackDetail { feedback, videos },
    }))
}

/// PATCH /api/v1/feedback/{id}
///
/// Owner edit, allowed while the feedback is pending or submitted and less
/// than 24 hours old.
pub async fn update_feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<FeedbackInput>,
) -> AppResult<Json<DataResponse<Feedback>>> {
    let patch = validate_feedback_patch(&input)?;
    if patch.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "No fields to update".into(),
        )));
    }

    let feedback = find_owned(&state, &auth, id).await?;
    let now = Utc::now();
    check_owner_edit(feedback.current_status()?, feedback.created_at, now)?;

    let cutoff = now - chrono::Duration::hours(EDIT_WINDOW_HOURS);
    let updated = FeedbackRepo::update_by_owner(
        &state.pool,
        id,
        auth.user_id,
        cutoff,
        &UpdateFeedback {
            product_url: patch.product_url,
            brand: patch.brand,
            size: patch.size,
            fit_score: patch.fit_score,
            kept_status: patch.kept_status,
        },
    )
    .await?
    // Status moved on between the check and the write.
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "Feedback can no longer be edited".into(),
        ))
    })?;

    tracing::info!(user_id = auth.user_id, feedback_id = id, "Feedback edited");
    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/feedback/{id}/video
///
/// Record an uploaded video and move the feedback under review. Terminal
/// feedback rejects the attachment with 409.
pub async fn attach_video(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<AttachVideoRequest>,
) -> AppResult<impl IntoResponse> {
    let reference =
        validate_video_reference(&input.storage_path, &input.format, input.video_type.as_deref())?;
    find_owned(&state, &auth, id).await?;

    let outcome = VideoRepo::attach(
        &state.pool,
        &CreateVideo {
            feedback_id: id,
            storage_path: reference.storage_path,
            format: reference.format,
            video_type: reference.video_type,
        },
    )
    .await?;

    match outcome {
        VideoAttachOutcome::Attached { video, feedback } => {
            tracing::info!(
                user_id = auth.user_id,
                feedback_id = id,
                video_id = video.id,
                status = %feedback.status,
                "Video attached",
            );
            Ok((
                StatusCode::CREATED,
                Json(DataResponse {
                    data: AttachedVideo {
                        video,
                        status: feedback.status,
                    },
                }),
            ))
        }
        VideoAttachOutcome::Closed(status) => Err(AppError::Core(CoreError::Conflict(format!(
            "Feedback is {status} and no longer accepts videos"
        )))),
        VideoAttachOutcome::NotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Feedback",
            id,
        })),
    }
}

/// POST /api/v1/feedback/{id}/video/validate
///
/// Run the sampled frames through the vision model. A passing report moves
/// a pending or submitted feedback under review.
pub async fn validate_video(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<ValidateVideoRequest>,
) -> AppResult<Json<DataResponse<ValidationOutcome>>> {
    if input.frames.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "At least one frame is required".into(),
        )));
    }
    if input.frames.len() > MAX_VIDEO_FRAMES {
        return Err(AppError::Core(CoreError::Validation(format!(
            "At most {MAX_VIDEO_FRAMES} frames may be submitted"
        ))));
    }

    let feedback = find_owned(&state, &auth, id).await?;
    let status = feedback.current_status()?;
    if status.is_terminal() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Feedback is {status} and no longer accepts videos"
        ))));
    }

    let analyzer = state.frame_analyzer.as_ref().ok_or_else(|| {
        AppError::Unavailable("Video validation is not configured".into())
    })?;
    let report = validate_frames(analyzer.as_ref(), &input.frames).await?;

    let mut status = feedback.status;
    if report.passed && status != FeedbackStatus::UnderReview.as_str() {
        if let Some(advanced) = FeedbackRepo::advance_to_under_review(&state.pool, id).await? {
            status = advanced.status;
        }
    }

    tracing::info!(
        user_id = auth.user_id,
        feedback_id = id,
        passed = report.passed,
        frames_analyzed = report.frames_analyzed,
        "Video frames validated",
    );

    Ok(Json(DataResponse {
        data: ValidationOutcome { report, status },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Feedback",
        id,
    })
}

/// Load a feedback the caller owns. Other users' feedback reads as missing.
async fn find_owned(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Feedback> {
    FeedbackRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|f| f.user_id == auth.user_id)
        .ok_or_else(|| not_found(id))
}

/// Load a feedback the caller owns or, as an administrator, may inspect.
async fn find_visible(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Feedback> {
    FeedbackRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|f| f.user_id == auth.user_id || auth.is_admin)
        .ok_or_else(|| not_found(id))
}
