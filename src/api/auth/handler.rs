//! Authentication handlers
//!
//! Registration, login, logout and email verification.

use std::time::Duration;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{FamilyRole, User, UserSummary};
use crate::db::repository::{family, family_member, user, verification_token};
use crate::utils::id::now_millis;
use crate::utils::validation::{
    MAX_PASSWORD_LEN, MIN_PASSWORD_LEN, validate_email,
};
use crate::utils::{AppError, AppResult, invite_code};

/// Fixed delay for authentication to blunt timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Verification tokens live for 24 hours
const VERIFICATION_TOKEN_TTL_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub invite_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserSummary,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

fn random_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// POST /api/auth/register - create an account, optionally joining a
/// family whose invite code was shared out of band
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let email = req.email.trim().to_lowercase();
    validate_email(&email)?;

    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if req.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at most {MAX_PASSWORD_LEN} characters"
        )));
    }

    if user::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::validation(
            "User with this email already exists",
        ));
    }

    // Resolve the invite code before creating anything
    let family = match &req.invite_code {
        Some(code) => {
            if !invite_code::is_valid_invite_code(code) {
                return Err(AppError::validation("Invalid invite code"));
            }
            Some(
                family::find_by_invite_code(&state.pool, code)
                    .await?
                    .ok_or_else(|| AppError::validation("Invalid invite code"))?,
            )
        }
        None => None,
    };

    let password_hash = User::hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    let name = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let created = user::create(&state.pool, &email, name, &password_hash).await?;

    let message = if let Some(family) = &family {
        family_member::insert(&state.pool, family.id, created.id, FamilyRole::Member).await?;
        "Registration successful! You have been added to the family.".to_string()
    } else {
        "Registration successful. Please check your email to verify your account.".to_string()
    };

    let token = random_token();
    verification_token::create(
        &state.pool,
        &created.email,
        &token,
        now_millis() + VERIFICATION_TOKEN_TTL_MS,
    )
    .await?;

    // Verification email failures must not lose the new account
    if let Err(e) = state.email.send_verification(&created.email, &token).await {
        tracing::warn!(email = %created.email, error = %e, "Verification email failed");
    }

    tracing::info!(user_id = created.id, email = %created.email, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message,
            user: created.summary(),
        }),
    ))
}

/// POST /api/auth/login - verify credentials and issue a session token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let email = req.email.trim().to_lowercase();

    let found = user::find_by_email(&state.pool, &email).await?;

    // Fixed delay before inspecting the result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message: never reveal whether the account exists
    let Some(account) = found else {
        tracing::warn!(email = %email, "Login failed - user not found");
        return Err(AppError::invalid_credentials());
    };

    let password_valid = account
        .verify_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !password_valid {
        tracing::warn!(email = %email, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    }

    let token = state
        .jwt_service()
        .generate_token(&account)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(user_id = account.id, email = %account.email, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: account.summary(),
    }))
}

/// GET /api/auth/me - fresh profile of the authenticated user
pub async fn me(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<User>> {
    let account = user::find_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(account))
}

/// POST /api/auth/logout - sessions are stateless JWTs; log and return
pub async fn logout(current_user: CurrentUser) -> AppResult<Json<serde_json::Value>> {
    tracing::info!(user_id = current_user.id, "User logged out");
    Ok(Json(serde_json::json!({ "message": "Logged out" })))
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: String,
}

/// GET /api/auth/verify?token= - consume a verification token
pub async fn verify(
    State(state): State<ServerState>,
    Query(query): Query<VerifyQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let record = verification_token::find_by_token(&state.pool, &query.token)
        .await?
        .ok_or_else(|| AppError::validation("Invalid or expired verification link"))?;

    if record.is_expired(now_millis()) {
        verification_token::delete_by_token(&state.pool, &query.token).await?;
        return Err(AppError::validation("This verification link has expired"));
    }

    let account = user::find_by_email(&state.pool, &record.identifier)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if account.email_verified.is_none() {
        user::mark_email_verified(&state.pool, account.id).await?;
    }
    verification_token::delete_by_token(&state.pool, &query.token).await?;

    tracing::info!(user_id = account.id, "Email verified");
    Ok(Json(serde_json::json!({ "message": "Email verified successfully" })))
}

#[derive(Debug, Deserialize)]
pub struct ResendRequest {
    pub email: String,
}

/// POST /api/auth/resend-verification - rotate and resend the token.
/// Always answers the same way; account existence stays private.
pub async fn resend_verification(
    State(state): State<ServerState>,
    Json(req): Json<ResendRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let email = req.email.trim().to_lowercase();
    let generic = serde_json::json!({
        "message": "If an account exists, a verification email has been sent"
    });

    let Some(account) = user::find_by_email(&state.pool, &email).await? else {
        return Ok(Json(generic));
    };
    if account.email_verified.is_some() {
        return Ok(Json(generic));
    }

    verification_token::delete_for_identifier(&state.pool, &email).await?;
    let token = random_token();
    verification_token::create(
        &state.pool,
        &email,
        &token,
        now_millis() + VERIFICATION_TOKEN_TTL_MS,
    )
    .await?;

    if let Err(e) = state.email.send_verification(&email, &token).await {
        tracing::warn!(email = %email, error = %e, "Verification email failed");
    }

    Ok(Json(generic))
}
