//! Handlers for the `/auth` resource: account creation, email verification,
//! sign-in/out, password reset and the session endpoints.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use fitback_core::account::{normalize_email, validate_email, validate_name};
use fitback_core::error::CoreError;
use fitback_core::session::{renewal_due, SessionIdentity};
use fitback_core::tokens::{generate_token, hash_token, is_well_formed, TokenPurpose};
use fitback_core::types::{DbId, Timestamp};
use fitback_db::models::auth_token::CreateAuthToken;
use fitback_db::models::user::{CreateUser, User};
use fitback_db::repositories::{AuthTokenRepo, UserRepo};
use fitback_events::{templates, EmailMessage};
use serde::{Deserialize, Serialize};

use crate::auth::cookie::{clear_session_cookie, session_cookie, token_from_headers};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::auth::session::{self, SessionCheck};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::SuccessResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Request body for `POST /auth/signin`.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Request body carrying a single-use emailed token.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

/// Request body for endpoints keyed on an email address only.
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// Request body for `POST /auth/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// `{ user }` body shared by every endpoint that reports the caller.
#[derive(Debug, Serialize)]
pub struct UserBody {
    pub user: SessionIdentity,
}

/// Body returned when a new session is issued.
///
/// The token is also set as a cookie; it is repeated here for clients that
/// send it back in the `x-session-id` header instead.
#[derive(Debug, Serialize)]
pub struct SessionBody {
    pub user: SessionIdentity,
    pub session_id: String,
    pub expires_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct ExtendBody {
    pub expires_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Create an unverified account and email a verification link.
pub async fn signup(
    State(state): State<AppState>,
    AppJson(input): AppJson<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    let email = normalize_email(&input.email);
    validate_email(&email)?;
    validate_name(&input.name)?;
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "An account with this email already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            is_admin: state.config.is_seed_admin(&email),
            email,
            password_hash,
            name: input.name.trim().to_string(),
        },
    )
    .await?;

    let token = issue_token(&state, user.id, TokenPurpose::EmailVerification).await?;
    send_best_effort(
        &state,
        templates::verification_email(&user.email, &user.name, &state.config.app_url, &token),
    )
    .await;

    tracing::info!(user_id = user.id, is_admin = user.is_admin, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(UserBody {
            user: identity_of(&user),
        })),
    ))
}

/// POST /api/v1/auth/verify-email
///
/// Consume a verification token, mark the address verified and sign the
/// user in.
pub async fn verify_email(
    State(state): State<AppState>,
    AppJson(input): AppJson<TokenRequest>,
) -> AppResult<impl IntoResponse> {
    let consumed = consume_token(&state, TokenPurpose::EmailVerification, &input.token)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "Verification link is invalid or has expired".into(),
            ))
        })?;

    let user = UserRepo::mark_email_verified(&state.pool, consumed)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: consumed,
        }))?;
    if user.is_blocked {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is blocked".into(),
        )));
    }

    send_best_effort(
        &state,
        templates::welcome_email(&user.email, &user.name, &state.config.app_url),
    )
    .await;
    tracing::info!(user_id = user.id, "Email verified");

    start_session(&state, &user).await
}

/// POST /api/v1/auth/resend-verification
///
/// Always 202 so the response does not reveal whether the account exists.
pub async fn resend_verification(
    State(state): State<AppState>,
    AppJson(input): AppJson<EmailRequest>,
) -> AppResult<impl IntoResponse> {
    let email = normalize_email(&input.email);
    if let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? {
        if !user.email_verified && !user.is_blocked {
            let token = issue_token(&state, user.id, TokenPurpose::EmailVerification).await?;
            send_best_effort(
                &state,
                templates::verification_email(
                    &user.email,
                    &user.name,
                    &state.config.app_url,
                    &token,
                ),
            )
            .await;
        }
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(SuccessResponse::new(MessageBody {
            message: "If the account exists and is unverified, a new link has been sent",
        })),
    ))
}

/// POST /api/v1/auth/signin
///
/// Check credentials, revoke every earlier session of the user and issue a
/// fresh one.
pub async fn signin(
    State(state): State<AppState>,
    AppJson(input): AppJson<SigninRequest>,
) -> AppResult<impl IntoResponse> {
    let email = normalize_email(&input.email);
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid());
    }

    if user.is_blocked {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is blocked".into(),
        )));
    }
    if !user.email_verified {
        return Err(AppError::Core(CoreError::Forbidden(
            "Email address is not verified".into(),
        )));
    }

    let revoked = session::delete_all_for_user(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, revoked, "User signed in");

    start_session(&state, &user).await
}

/// POST /api/v1/auth/signout
///
/// Delete the presented session, if any, and clear the cookie.
pub async fn signout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    if let Some(token) = token_from_headers(&headers) {
        session::delete(&state.pool, &token).await?;
    }
    Ok((
        [(SET_COOKIE, clear_session_cookie(state.config.secure_cookies))],
        Json(SuccessResponse::new(MessageBody {
            message: "Signed out",
        })),
    ))
}

/// POST /api/v1/auth/forgot-password
///
/// Always 202; emails a one-hour reset link when the account exists.
pub async fn forgot_password(
    State(state): State<AppState>,
    AppJson(input): AppJson<EmailRequest>,
) -> AppResult<impl IntoResponse> {
    let email = normalize_email(&input.email);
    if let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? {
        if !user.is_blocked {
            let token = issue_token(&state, user.id, TokenPurpose::PasswordReset).await?;
            send_best_effort(
                &state,
                templates::password_reset_email(
                    &user.email,
                    &user.name,
                    &state.config.app_url,
                    &token,
                ),
            )
            .await;
        }
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(SuccessResponse::new(MessageBody {
            message: "If the account exists, a reset link has been sent",
        })),
    ))
}

/// POST /api/v1/auth/reset-password
///
/// Consume a reset token, store the new password and revoke every session
/// of the user.
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(input): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<SuccessResponse<MessageBody>>> {
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let user_id = consume_token(&state, TokenPurpose::PasswordReset, &input.token)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "Reset link is invalid or has expired".into(),
            ))
        })?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user_id, &password_hash).await?;
    let revoked = session::delete_all_for_user(&state.pool, user_id).await?;
    tracing::info!(user_id, revoked, "Password reset");

    Ok(Json(SuccessResponse::new(MessageBody {
        message: "Password updated",
    })))
}

/// GET /api/v1/auth/session
///
/// Report the signed-in user. Renews the session when the last renewal is
/// at least a day old and re-issues the cookie alongside.
pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let token = token_from_headers(&headers).ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized("Session not found".into()))
    })?;

    let found = match session::validate(&state.pool, &token).await? {
        SessionCheck::Valid(found) => found,
        other => {
            let reason = other.failure_reason().unwrap_or("Unauthorized");
            return Err(AppError::Core(CoreError::Unauthorized(reason.into())));
        }
    };
    if found.is_blocked {
        return Err(AppError::Core(CoreError::unauthorized()));
    }

    let mut cookie = None;
    if renewal_due(found.last_activity, Utc::now()) {
        if session::extend(&state.pool, &token).await?.is_some() {
            tracing::debug!(user_id = found.user_id, "Session renewed");
            cookie = Some(session_cookie(&token, state.config.secure_cookies));
        }
    }

    let body = Json(SuccessResponse::new(UserBody {
        user: found.identity(),
    }));
    Ok(match cookie {
        Some(cookie) => ([(SET_COOKIE, cookie)], body).into_response(),
        None => body.into_response(),
    })
}

/// POST /api/v1/auth/session/extend
///
/// Explicit renewal. Not throttled.
pub async fn extend_session(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let extended = session::extend(&state.pool, &auth.token)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::unauthorized()))?;

    Ok((
        [(
            SET_COOKIE,
            session_cookie(&auth.token, state.config.secure_cookies),
        )],
        Json(SuccessResponse::new(ExtendBody {
            expires_at: extended.expires_at,
        })),
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn identity_of(user: &User) -> SessionIdentity {
    SessionIdentity {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        is_admin: user.is_admin,
        email_verified: user.email_verified,
    }
}

/// Create a session and build the cookie-setting response.
async fn start_session(state: &AppState, user: &User) -> AppResult<axum::response::Response> {
    let issued = session::create(&state.pool, user.id).await?;
    let cookie = session_cookie(&issued.token, state.config.secure_cookies);

    Ok((
        [(SET_COOKIE, cookie)],
        Json(SuccessResponse::new(SessionBody {
            user: identity_of(user),
            session_id: issued.token,
            expires_at: issued.session.expires_at,
        })),
    )
        .into_response())
}

/// Store a new single-use token and return its plaintext for the email link.
async fn issue_token(state: &AppState, user_id: DbId, purpose: TokenPurpose) -> AppResult<String> {
    let token = generate_token();
    AuthTokenRepo::issue(
        &state.pool,
        &CreateAuthToken {
            user_id,
            purpose,
            token_hash: token.hash,
            expires_at: Utc::now() + purpose.ttl(),
        },
    )
    .await?;
    Ok(token.plaintext)
}

/// Spend an emailed token. Returns the owning user id when it was valid.
async fn consume_token(
    state: &AppState,
    purpose: TokenPurpose,
    token: &str,
) -> AppResult<Option<DbId>> {
    let token = token.trim();
    if !is_well_formed(token) {
        return Ok(None);
    }
    let consumed =
        AuthTokenRepo::consume(&state.pool, purpose, &hash_token(token), Utc::now()).await?;
    Ok(consumed.map(|t| t.user_id))
}

/// Send an email without failing the request on delivery errors.
pub(crate) async fn send_best_effort(state: &AppState, message: EmailMessage) {
    if let Err(e) = state.mailer.send(&message).await {
        tracing::warn!(to = %message.to, subject = %message.subject, error = %e, "Email delivery failed");
    }
}
