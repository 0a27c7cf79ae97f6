//! Administrator endpoints: the feedback review queue, review decisions and
//! account blocking.
//!
//! Every handler takes [`RequireAdmin`], so non-administrators are turned
//! away with 403 before any of this runs.

use axum::extract::{Path, Query, State};
use axum::Json;
use fitback_core::error::CoreError;
use fitback_core::feedback::{validate_review_notes, FeedbackStatus, ReviewAction};
use fitback_core::types::DbId;
use fitback_db::models::feedback::FeedbackQueueItem;
use fitback_db::models::review::{AdminReview, ReviewOutcome};
use fitback_db::models::user::UserResponse;
use fitback_db::repositories::{FeedbackRepo, ReviewRepo, UserRepo};
use fitback_events::bus::{DomainEvent, FEEDBACK_APPROVED, FEEDBACK_REJECTED};
use serde::{Deserialize, Serialize};

use crate::auth::session;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{DataResponse, SuccessResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/feedback/review`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub feedback_id: DbId,
    /// `"approve"` or `"reject"`.
    pub action: String,
    /// Shown to the user; required when rejecting.
    pub comments: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    /// `true` when the same decision was already in place and nothing changed.
    pub already_processed: bool,
    pub status: String,
}

/// Query parameters for `GET /admin/feedback`.
#[derive(Debug, Deserialize)]
pub struct QueueParams {
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/feedback/review
///
/// Approve or reject a submission. Repeating a decision is a no-op that
/// reports `alreadyProcessed: true`; contradicting one is a 409.
pub async fn review_feedback(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<ReviewRequest>,
) -> AppResult<Json<SuccessResponse<ReviewResult>>> {
    let action = parse_action(&input.action)?;
    let notes = validate_review_notes(action, input.comments.as_deref())?;

    let outcome = ReviewRepo::decide(
        &state.pool,
        input.feedback_id,
        admin.user_id,
        action,
        notes.as_deref(),
    )
    .await?;

    let (feedback, already_processed) = match outcome {
        ReviewOutcome::Applied(feedback) => (feedback, false),
        ReviewOutcome::AlreadyProcessed(feedback) => (feedback, true),
        ReviewOutcome::Conflict(current) => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Feedback is already {current} and cannot be {}",
                action.target_status()
            ))));
        }
        ReviewOutcome::NotFound => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Feedback",
                id: input.feedback_id,
            }));
        }
    };

    if !already_processed {
        let event_type = match action {
            ReviewAction::Approve => FEEDBACK_APPROVED,
            ReviewAction::Reject => FEEDBACK_REJECTED,
        };
        state.event_bus.publish(
            DomainEvent::new(event_type)
                .with_source("feedback", feedback.id)
                .with_actor(admin.user_id)
                .with_subject(feedback.user_id)
                .with_payload(serde_json::json!({
                    "brand": feedback.brand,
                    "amount": feedback.cashback_amount,
                    "notes": notes,
                })),
        );
    } else {
        tracing::debug!(
            feedback_id = feedback.id,
            decision = action.decision(),
            "Review repeated, nothing to do",
        );
    }

    Ok(Json(SuccessResponse::new(ReviewResult {
        already_processed,
        status: feedback.status,
    })))
}

/// GET /api/v1/admin/feedback?status=
///
/// Review queue, oldest first. Without `status` every feedback is listed.
pub async fn list_queue(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<QueueParams>,
) -> AppResult<Json<DataResponse<Vec<FeedbackQueueItem>>>> {
    let status = params
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<FeedbackStatus>)
        .transpose()?;
    let items = FeedbackRepo::list_queue(&state.pool, status).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/admin/feedback/{id}/reviews
///
/// Audit trail of decisions on one feedback.
pub async fn list_reviews(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AdminReview>>>> {
    FeedbackRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Feedback",
            id,
        }))?;
    let reviews = ReviewRepo::list_for_feedback(&state.pool, id).await?;
    Ok(Json(DataResponse { data: reviews }))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: users.iter().map(UserResponse::from).collect(),
    }))
}

/// POST /api/v1/admin/users/{id}/block
///
/// Block an account and revoke all of its sessions.
pub async fn block_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot block your own account".into(),
        )));
    }

    let user = UserRepo::set_blocked(&state.pool, id, true)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    let revoked = session::delete_all_for_user(&state.pool, id).await?;

    tracing::info!(admin_id = admin.user_id, user_id = id, revoked, "User blocked");

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// POST /api/v1/admin/users/{id}/unblock
pub async fn unblock_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::set_blocked(&state.pool, id, false)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(admin_id = admin.user_id, user_id = id, "User unblocked");

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

fn parse_action(raw: &str) -> Result<ReviewAction, CoreError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "approve" => Ok(ReviewAction::Approve),
        "reject" => Ok(ReviewAction::Reject),
        other => Err(CoreError::Validation(format!(
            "Unknown action '{other}'; expected 'approve' or 'reject'"
        ))),
    }
}
