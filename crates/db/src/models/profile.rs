//! Per-user profile: measurements and payout identifiers.

use fitback_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserProfile {
    pub id: DbId,
    pub user_id: DbId,
    pub display_name: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub chest_cm: Option<i32>,
    pub waist_cm: Option<i32>,
    pub hip_cm: Option<i32>,
    pub upi_id: Option<String>,
    pub paypal_email: Option<String>,
    pub profile_completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Full replacement of the editable profile fields.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub display_name: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub chest_cm: Option<i32>,
    pub waist_cm: Option<i32>,
    pub hip_cm: Option<i32>,
    pub upi_id: Option<String>,
    pub paypal_email: Option<String>,
    pub profile_completed: bool,
}
