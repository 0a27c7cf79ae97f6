//! Feedback lifecycle, validation and the owner edit window.
//!
//! ```text
//! pending|submitted --video attached / validated--> under_review
//! pending|submitted|under_review --approve--> approved   (credits cashback)
//! pending|submitted|under_review --reject-->  rejected
//! approved --payout--> rewarded
//! ```
//!
//! `approved`, `rewarded` and `rejected` are terminal for review purposes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Cashback credited on approval, in wallet units.
pub const DEFAULT_CASHBACK_AMOUNT: i64 = 50;

/// Inclusive fit score range.
pub const FIT_SCORE_MIN: i16 = 1;
pub const FIT_SCORE_MAX: i16 = 5;

/// Minimum brand length after trimming.
pub const MIN_BRAND_LENGTH: usize = 2;

/// Maximum size label length.
pub const MAX_SIZE_LENGTH: usize = 20;

/// Maximum product URL length.
pub const MAX_URL_LENGTH: usize = 2048;

/// Owners may amend a submission for this many hours after creating it.
pub const EDIT_WINDOW_HOURS: i64 = 24;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^\s/?#]+\.[^\s/?#]+(?:[/?#]\S*)?$").expect("url regex is valid")
});

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status stored in `feedbacks.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    Pending,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Rewarded,
}

impl FeedbackStatus {
    pub const ALL: [FeedbackStatus; 6] = [
        FeedbackStatus::Pending,
        FeedbackStatus::Submitted,
        FeedbackStatus::UnderReview,
        FeedbackStatus::Approved,
        FeedbackStatus::Rejected,
        FeedbackStatus::Rewarded,
    ];

    /// Statuses from which an administrator decision is still possible.
    pub const REVIEWABLE: [FeedbackStatus; 3] = [
        FeedbackStatus::Pending,
        FeedbackStatus::Submitted,
        FeedbackStatus::UnderReview,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackStatus::Pending => "pending",
            FeedbackStatus::Submitted => "submitted",
            FeedbackStatus::UnderReview => "under_review",
            FeedbackStatus::Approved => "approved",
            FeedbackStatus::Rejected => "rejected",
            FeedbackStatus::Rewarded => "rewarded",
        }
    }

    /// No review transition leaves a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FeedbackStatus::Approved | FeedbackStatus::Rejected | FeedbackStatus::Rewarded
        )
    }

    /// Cashback is attributable to the user only in these statuses.
    pub fn is_reward_bearing(self) -> bool {
        matches!(self, FeedbackStatus::Approved | FeedbackStatus::Rewarded)
    }

    /// Owner edits are only allowed before any video is in review.
    pub fn is_owner_editable(self) -> bool {
        matches!(self, FeedbackStatus::Pending | FeedbackStatus::Submitted)
    }

    /// Status after a video is attached or passes validation.
    ///
    /// Never advances past `under_review`; terminal statuses are refused.
    pub fn after_video(self) -> Result<FeedbackStatus, CoreError> {
        match self {
            FeedbackStatus::Pending | FeedbackStatus::Submitted | FeedbackStatus::UnderReview => {
                Ok(FeedbackStatus::UnderReview)
            }
            terminal => Err(CoreError::Conflict(format!(
                "Feedback is already {terminal}; videos can no longer be attached"
            ))),
        }
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeedbackStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown feedback status '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Review decisions
// ---------------------------------------------------------------------------

/// Administrator decision on a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    /// Status the feedback moves to.
    pub fn target_status(self) -> FeedbackStatus {
        match self {
            ReviewAction::Approve => FeedbackStatus::Approved,
            ReviewAction::Reject => FeedbackStatus::Rejected,
        }
    }

    /// Value recorded in `admin_reviews.decision`.
    pub fn decision(self) -> &'static str {
        self.target_status().as_str()
    }
}

/// What a review request should do given the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewPlan {
    /// Perform the transition and its side effects.
    Apply,
    /// The same decision was already recorded; do nothing.
    AlreadyApplied,
}

/// Decide how to handle `action` for a feedback currently in `current`.
///
/// Repeating a decision is a no-op so cashback is credited at most once.
/// Contradicting a terminal decision is a conflict.
pub fn plan_review(current: FeedbackStatus, action: ReviewAction) -> Result<ReviewPlan, CoreError> {
    if !current.is_terminal() {
        return Ok(ReviewPlan::Apply);
    }
    let same = match action {
        ReviewAction::Approve => current.is_reward_bearing(),
        ReviewAction::Reject => current == FeedbackStatus::Rejected,
    };
    if same {
        Ok(ReviewPlan::AlreadyApplied)
    } else {
        Err(CoreError::Conflict(format!(
            "Feedback is already {current} and cannot be {}",
            action.target_status()
        )))
    }
}

/// Rejections must carry a reason that is shown to the user.
pub fn validate_review_notes(
    action: ReviewAction,
    notes: Option<&str>,
) -> Result<Option<String>, CoreError> {
    let notes = notes.map(str::trim).filter(|n| !n.is_empty());
    if action == ReviewAction::Reject && notes.is_none() {
        return Err(CoreError::Validation(
            "A rejection reason is required".into(),
        ));
    }
    Ok(notes.map(str::to_string))
}

// ---------------------------------------------------------------------------
// Kept status
// ---------------------------------------------------------------------------

/// What the user did with the purchased item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeptStatus {
    Kept,
    Returned,
    WantToReturn,
}

impl KeptStatus {
    pub const ALL: [KeptStatus; 3] = [KeptStatus::Kept, KeptStatus::Returned, KeptStatus::WantToReturn];

    pub fn as_str(self) -> &'static str {
        match self {
            KeptStatus::Kept => "kept",
            KeptStatus::Returned => "returned",
            KeptStatus::WantToReturn => "want_to_return",
        }
    }
}

impl FromStr for KeptStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeptStatus::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Must be one of: {}",
                    KeptStatus::ALL.map(KeptStatus::as_str).join(", ")
                )
            })
    }
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

/// Raw submission fields as received from a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackInput {
    pub product_url: Option<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub fit_score: Option<i64>,
    pub kept_status: Option<String>,
}

/// Submission fields after validation and trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidFeedback {
    pub product_url: String,
    pub brand: String,
    pub size: String,
    pub fit_score: i16,
    pub kept_status: KeptStatus,
}

/// Partial update after validation. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidFeedbackPatch {
    pub product_url: Option<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub fit_score: Option<i16>,
    pub kept_status: Option<KeptStatus>,
}

impl ValidFeedbackPatch {
    pub fn is_empty(&self) -> bool {
        *self == ValidFeedbackPatch::default()
    }
}

fn check_url(url: &str) -> Result<String, String> {
    let url = url.trim();
    if url.is_empty() {
        return Err("Product URL is required".into());
    }
    if url.len() > MAX_URL_LENGTH {
        return Err(format!("Product URL must be at most {MAX_URL_LENGTH} characters"));
    }
    if !URL_RE.is_match(url) {
        return Err("Product URL must be a valid http or https link".into());
    }
    Ok(url.to_string())
}

fn check_brand(brand: &str) -> Result<String, String> {
    let brand = brand.trim();
    if brand.chars().count() < MIN_BRAND_LENGTH {
        return Err(format!("Brand must be at least {MIN_BRAND_LENGTH} characters"));
    }
    Ok(brand.to_string())
}

fn check_size(size: &str) -> Result<String, String> {
    let size = size.trim();
    if size.is_empty() {
        return Err("Size is required".into());
    }
    if size.chars().count() > MAX_SIZE_LENGTH {
        return Err(format!("Size must be at most {MAX_SIZE_LENGTH} characters"));
    }
    Ok(size.to_string())
}

fn check_fit_score(score: i64) -> Result<i16, String> {
    if score < i64::from(FIT_SCORE_MIN) || score > i64::from(FIT_SCORE_MAX) {
        return Err(format!(
            "Fit score must be between {FIT_SCORE_MIN} and {FIT_SCORE_MAX}"
        ));
    }
    // In range, so the narrowing cannot truncate.
    Ok(score as i16)
}

/// Collects per-field results into one field-keyed error map.
#[derive(Default)]
struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    fn take<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(msg) => {
                self.0.insert(field.to_string(), msg);
                None
            }
        }
    }

    fn required<T>(&mut self, field: &str, value: Option<T>, label: &str) -> Option<T> {
        if value.is_none() {
            self.0.insert(field.to_string(), format!("{label} is required"));
        }
        value
    }

    fn finish(self) -> Result<(), CoreError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidFields(self.0))
        }
    }
}

/// Validate a new submission. All failing fields are reported at once.
pub fn validate_new_feedback(input: &FeedbackInput) -> Result<ValidFeedback, CoreError> {
    let mut errors = FieldErrors::default();

    let url = errors
        .required("productUrl", input.product_url.as_deref(), "Product URL")
        .and_then(|u| errors.take("productUrl", check_url(u)));
    let brand = errors
        .required("brand", input.brand.as_deref(), "Brand")
        .and_then(|b| errors.take("brand", check_brand(b)));
    let size = errors
        .required("size", input.size.as_deref(), "Size")
        .and_then(|s| errors.take("size", check_size(s)));
    let fit_score = errors
        .required("fitScore", input.fit_score, "Fit score")
        .and_then(|f| errors.take("fitScore", check_fit_score(f)));
    let kept_status = errors
        .required("keptStatus", input.kept_status.as_deref(), "Kept status")
        .and_then(|k| errors.take("keptStatus", k.parse::<KeptStatus>()));

    errors.finish()?;

    match (url, brand, size, fit_score, kept_status) {
        (Some(product_url), Some(brand), Some(size), Some(fit_score), Some(kept_status)) => {
            Ok(ValidFeedback {
                product_url,
                brand,
                size,
                fit_score,
                kept_status,
            })
        }
        _ => Err(CoreError::Internal(
            "feedback validation produced no value and no error".into(),
        )),
    }
}

/// Validate an owner edit. Absent fields are left unchanged.
pub fn validate_feedback_patch(input: &FeedbackInput) -> Result<ValidFeedbackPatch, CoreError> {
    let mut errors = FieldErrors::default();

    let patch = ValidFeedbackPatch {
        product_url: input
            .product_url
            .as_deref()
            .and_then(|u| errors.take("productUrl", check_url(u))),
        brand: input
            .brand
            .as_deref()
            .and_then(|b| errors.take("brand", check_brand(b))),
        size: input
            .size
            .as_deref()
            .and_then(|s| errors.take("size", check_size(s))),
        fit_score: input
            .fit_score
            .and_then(|f| errors.take("fitScore", check_fit_score(f))),
        kept_status: input
            .kept_status
            .as_deref()
            .and_then(|k| errors.take("keptStatus", k.parse::<KeptStatus>())),
    };

    errors.finish()?;
    Ok(patch)
}

// ---------------------------------------------------------------------------
// Video references
// ---------------------------------------------------------------------------

/// Container formats accepted for try-on videos.
pub const VIDEO_FORMATS: [&str; 3] = ["mp4", "webm", "mov"];

/// `original` is the raw upload; `edited` is a re-cut supplied later.
pub const VIDEO_TYPES: [&str; 2] = ["original", "edited"];

/// A validated pointer to an uploaded video object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReference {
    pub storage_path: String,
    pub format: String,
    pub video_type: String,
}

/// Validate the storage reference a client reports after uploading.
pub fn validate_video_reference(
    storage_path: &str,
    format: &str,
    video_type: Option<&str>,
) -> Result<VideoReference, CoreError> {
    let mut errors = FieldErrors::default();

    let storage_path = storage_path.trim();
    if storage_path.is_empty() {
        errors.0.insert("storagePath".into(), "Storage path is required".into());
    }
    let format = format.trim().trim_start_matches('.').to_lowercase();
    if !VIDEO_FORMATS.contains(&format.as_str()) {
        errors.0.insert(
            "format".into(),
            format!("Must be one of: {}", VIDEO_FORMATS.join(", ")),
        );
    }
    let video_type = video_type.map(str::trim).unwrap_or(VIDEO_TYPES[0]);
    if !VIDEO_TYPES.contains(&video_type) {
        errors.0.insert(
            "videoType".into(),
            format!("Must be one of: {}", VIDEO_TYPES.join(", ")),
        );
    }

    errors.finish()?;
    Ok(VideoReference {
        storage_path: storage_path.to_string(),
        format,
        video_type: video_type.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Edit window
// ---------------------------------------------------------------------------

/// Whether `now` is still inside the owner edit window.
pub fn within_edit_window(created_at: Timestamp, now: Timestamp) -> bool {
    now - created_at < chrono::Duration::hours(EDIT_WINDOW_HOURS)
}

/// Gate an owner edit on status and elapsed time.
///
/// Evaluated lazily on every edit attempt; there is no expiry job.
pub fn check_owner_edit(
    status: FeedbackStatus,
    created_at: Timestamp,
    now: Timestamp,
) -> Result<(), CoreError> {
    if !status.is_owner_editable() {
        return Err(CoreError::Conflict(format!(
            "Feedback is {status} and can no longer be edited"
        )));
    }
    if !within_edit_window(created_at, now) {
        return Err(CoreError::Forbidden(format!(
            "Feedback can only be edited within {EDIT_WINDOW_HOURS} hours of submission"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn valid_input() -> FeedbackInput {
        FeedbackInput {
            product_url: Some("https://x.com/p1".into()),
            brand: Some("Nike".into()),
            size: Some("M".into()),
            fit_score: Some(3),
            kept_status: Some("kept".into()),
        }
    }

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 5, 10, 9, 30, 0).unwrap()
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in FeedbackStatus::ALL {
            assert_eq!(status.as_str().parse::<FeedbackStatus>().unwrap(), status);
        }
        assert!("archived".parse::<FeedbackStatus>().is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(FeedbackStatus::Approved.is_terminal());
        assert!(FeedbackStatus::Rewarded.is_terminal());
        assert!(FeedbackStatus::Rejected.is_terminal());
        assert!(!FeedbackStatus::UnderReview.is_terminal());
        assert!(!FeedbackStatus::Pending.is_terminal());
    }

    #[test]
    fn only_approved_and_rewarded_bear_cashback() {
        let bearing: Vec<_> = FeedbackStatus::ALL
            .into_iter()
            .filter(|s| s.is_reward_bearing())
            .collect();
        assert_eq!(bearing, vec![FeedbackStatus::Approved, FeedbackStatus::Rewarded]);
    }

    #[test]
    fn video_moves_to_under_review_but_never_past_it() {
        assert_eq!(
            FeedbackStatus::Pending.after_video().unwrap(),
            FeedbackStatus::UnderReview
        );
        assert_eq!(
            FeedbackStatus::UnderReview.after_video().unwrap(),
            FeedbackStatus::UnderReview
        );
        assert_matches!(
            FeedbackStatus::Approved.after_video(),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn review_applies_to_open_feedback() {
        for status in FeedbackStatus::REVIEWABLE {
            assert_eq!(plan_review(status, ReviewAction::Approve).unwrap(), ReviewPlan::Apply);
            assert_eq!(plan_review(status, ReviewAction::Reject).unwrap(), ReviewPlan::Apply);
        }
    }

    #[test]
    fn repeated_approval_is_noop() {
        assert_eq!(
            plan_review(FeedbackStatus::Approved, ReviewAction::Approve).unwrap(),
            ReviewPlan::AlreadyApplied
        );
        assert_eq!(
            plan_review(FeedbackStatus::Rewarded, ReviewAction::Approve).unwrap(),
            ReviewPlan::AlreadyApplied
        );
    }

    #[test]
    fn contradicting_terminal_decision_conflicts() {
        assert_matches!(
            plan_review(FeedbackStatus::Rejected, ReviewAction::Approve),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            plan_review(FeedbackStatus::Approved, ReviewAction::Reject),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn rejection_requires_notes() {
        assert!(validate_review_notes(ReviewAction::Reject, None).is_err());
        assert!(validate_review_notes(ReviewAction::Reject, Some("  ")).is_err());
        assert_eq!(
            validate_review_notes(ReviewAction::Reject, Some(" blurry video ")).unwrap(),
            Some("blurry video".to_string())
        );
        assert_eq!(validate_review_notes(ReviewAction::Approve, None).unwrap(), None);
    }

    #[test]
    fn valid_feedback_passes() {
        let valid = validate_new_feedback(&valid_input()).unwrap();
        assert_eq!(valid.brand, "Nike");
        assert_eq!(valid.fit_score, 3);
        assert_eq!(valid.kept_status, KeptStatus::Kept);
    }

    #[test]
    fn every_bad_field_is_reported() {
        let input = FeedbackInput {
            product_url: Some("ftp://x.com/p1".into()),
            brand: Some("N".into()),
            size: Some("".into()),
            fit_score: Some(9),
            kept_status: Some("lost".into()),
        };
        let err = validate_new_feedback(&input).unwrap_err();
        let CoreError::InvalidFields(fields) = err else {
            panic!("expected field map");
        };
        let keys: Vec<_> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["brand", "fitScore", "keptStatus", "productUrl", "size"]);
    }

    #[test]
    fn missing_fields_are_required() {
        let err = validate_new_feedback(&FeedbackInput::default()).unwrap_err();
        let CoreError::InvalidFields(fields) = err else {
            panic!("expected field map");
        };
        assert_eq!(fields.len(), 5);
        assert_eq!(fields["brand"], "Brand is required");
    }

    #[test]
    fn url_requires_http_scheme_and_host() {
        assert!(check_url("https://shop.example.com/item?id=1").is_ok());
        assert!(check_url("http://x.com").is_ok());
        assert!(check_url("x.com/p1").is_err());
        assert!(check_url("javascript:alert(1)").is_err());
        assert!(check_url("https://localhost").is_err());
    }

    #[test]
    fn fit_score_bounds() {
        assert!(check_fit_score(1).is_ok());
        assert!(check_fit_score(5).is_ok());
        assert!(check_fit_score(0).is_err());
        assert!(check_fit_score(6).is_err());
    }

    #[test]
    fn patch_only_validates_present_fields() {
        let patch = validate_feedback_patch(&FeedbackInput {
            size: Some("L".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.size.as_deref(), Some("L"));
        assert!(patch.brand.is_none());

        assert!(validate_feedback_patch(&FeedbackInput::default()).unwrap().is_empty());
        assert_matches!(
            validate_feedback_patch(&FeedbackInput {
                fit_score: Some(0),
                ..Default::default()
            }),
            Err(CoreError::InvalidFields(_))
        );
    }

    #[test]
    fn edit_window_boundary() {
        let created = t0();
        assert!(within_edit_window(created, created + Duration::minutes(23 * 60 + 59)));
        assert!(!within_edit_window(created, created + Duration::hours(24)));
        assert!(!within_edit_window(created, created + Duration::minutes(24 * 60 + 1)));
    }

    #[test]
    fn owner_edit_gated_by_status_and_time() {
        let created = t0();
        let inside = created + Duration::hours(1);
        let outside = created + Duration::minutes(24 * 60 + 1);

        assert!(check_owner_edit(FeedbackStatus::Pending, created, inside).is_ok());
        assert_matches!(
            check_owner_edit(FeedbackStatus::Pending, created, outside),
            Err(CoreError::Forbidden(_))
        );
        assert_matches!(
            check_owner_edit(FeedbackStatus::Approved, created, inside),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            check_owner_edit(FeedbackStatus::UnderReview, created, inside),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn video_reference_defaults_and_normalizes() {
        let v = validate_video_reference(" uploads/1/a.mp4 ", ".MP4", None).unwrap();
        assert_eq!(v.storage_path, "uploads/1/a.mp4");
        assert_eq!(v.format, "mp4");
        assert_eq!(v.video_type, "original");
    }

    #[test]
    fn video_reference_reports_each_bad_field() {
        let err = validate_video_reference("", "avi", Some("teaser")).unwrap_err();
        assert_matches!(err, CoreError::InvalidFields(fields) => {
            assert!(fields.contains_key("storagePath"));
            assert!(fields.contains_key("format"));
            assert!(fields.contains_key("videoType"));
        });
    }
}
