//! Handlers for the caller's own profile.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use fitback_core::account::{
    is_profile_complete, validate_email, validate_measurement, validate_name,
    CIRCUMFERENCE_RANGE_CM, HEIGHT_RANGE_CM, WEIGHT_RANGE_KG,
};
use fitback_core::error::CoreError;
use fitback_db::models::profile::{UpdateProfile, UserProfile};
use fitback_db::models::user::UserResponse;
use fitback_db::repositories::{ProfileRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /profile`. Replaces every editable field.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<i32>,
    pub chest_cm: Option<i32>,
    pub waist_cm: Option<i32>,
    pub hip_cm: Option<i32>,
    pub upi_id: Option<String>,
    pub paypal_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub user: UserResponse,
    pub profile: UserProfile,
}

/// GET /api/v1/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<ProfileView>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    let profile = ProfileRepo::get_or_create(&state.pool, auth.user_id).await?;

    Ok(Json(DataResponse {
        data: ProfileView {
            user: UserResponse::from(&user),
            profile,
        },
    }))
}

/// PUT /api/v1/profile
///
/// `profile_completed` is derived, never taken from the client.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<ProfileView>>> {
    let input = normalize(input);
    check(&input)?;

    let user = match &input.name {
        Some(name) => UserRepo::update_name(&state.pool, auth.user_id, name).await?,
        None => UserRepo::find_by_id(&state.pool, auth.user_id).await?,
    }
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "User",
        id: auth.user_id,
    }))?;

    let profile_completed = is_profile_complete(
        input.height_cm,
        input.weight_kg,
        input.upi_id.as_deref(),
        input.paypal_email.as_deref(),
    );
    let profile = ProfileRepo::upsert(
        &state.pool,
        auth.user_id,
        &UpdateProfile {
            display_name: input.display_name,
            height_cm: input.height_cm,
            weight_kg: input.weight_kg,
            chest_cm: input.chest_cm,
            waist_cm: input.waist_cm,
            hip_cm: input.hip_cm,
            upi_id: input.upi_id,
            paypal_email: input.paypal_email,
            profile_completed,
        },
    )
    .await?;

    tracing::info!(user_id = auth.user_id, profile_completed, "Profile updated");

    Ok(Json(DataResponse {
        data: ProfileView {
            user: UserResponse::from(&user),
            profile,
        },
    }))
}

/// Trim text fields; blank strings become `None`.
fn normalize(mut input: UpdateProfileRequest) -> UpdateProfileRequest {
    fn clean(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
    input.name = clean(input.name);
    input.display_name = clean(input.display_name);
    input.upi_id = clean(input.upi_id);
    input.paypal_email = clean(input.paypal_email).map(|e| e.to_lowercase());
    input
}

fn check(input: &UpdateProfileRequest) -> Result<(), CoreError> {
    let mut fields = BTreeMap::new();

    if let Some(name) = &input.name {
        if let Err(CoreError::Validation(msg)) = validate_name(name) {
            fields.insert("name".to_string(), msg);
        }
    }
    if let Some(email) = &input.paypal_email {
        if validate_email(email).is_err() {
            fields.insert("paypal_email".to_string(), "Invalid email address".to_string());
        }
    }

    let measurements = [
        ("height_cm", input.height_cm, HEIGHT_RANGE_CM),
        ("weight_kg", input.weight_kg, WEIGHT_RANGE_KG),
        ("chest_cm", input.chest_cm, CIRCUMFERENCE_RANGE_CM),
        ("waist_cm", input.waist_cm, CIRCUMFERENCE_RANGE_CM),
        ("hip_cm", input.hip_cm, CIRCUMFERENCE_RANGE_CM),
    ];
    for (field, value, range) in measurements {
        if let Err(msg) = validate_measurement(field, value, range) {
            fields.insert(field.to_string(), msg);
        }
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InvalidFields(fields))
    }
}
