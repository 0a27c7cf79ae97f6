//! Account and profile validation rules.
//!
//! Shared by signup, sign-in and profile updates so every path applies the
//! same normalisation to email addresses.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Maximum length of a display name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Accepted body height range in centimetres.
pub const HEIGHT_RANGE_CM: (i32, i32) = (100, 250);

/// Accepted body weight range in kilograms.
pub const WEIGHT_RANGE_KG: (i32, i32) = (30, 300);

/// Accepted chest/waist/hip circumference range in centimetres.
pub const CIRCUMFERENCE_RANGE_CM: (i32, i32) = (40, 200);

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

/// Trim and lower-case an email address. Emails are stored case-folded.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate an already-normalised email address.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.is_empty() {
        return Err(CoreError::Validation("Email is required".into()));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(CoreError::Validation(format!(
            "Invalid email address '{email}'"
        )));
    }
    Ok(())
}

/// Validate a display name.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Name is required".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Check an optional measurement against an inclusive range.
pub fn validate_measurement(
    field: &str,
    value: Option<i32>,
    (min, max): (i32, i32),
) -> Result<(), String> {
    match value {
        Some(v) if v < min || v > max => Err(format!("{field} must be between {min} and {max}")),
        _ => Ok(()),
    }
}

/// A profile counts as complete once the fit-relevant measurements and at
/// least one payout identifier are present.
pub fn is_profile_complete(
    height_cm: Option<i32>,
    weight_kg: Option<i32>,
    upi_id: Option<&str>,
    paypal_email: Option<&str>,
) -> bool {
    let has_payout = [upi_id, paypal_email]
        .into_iter()
        .flatten()
        .any(|s| !s.trim().is_empty());
    height_cm.is_some() && weight_kg.is_some() && has_payout
}
