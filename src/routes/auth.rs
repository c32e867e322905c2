// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: registration, login, logout and password reset.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidateEmail};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, LOGGED_IN_COOKIE, SESSION_COOKIE, SESSION_DAYS};
use crate::models::user::{new_avatar_uid, normalize_email};
use crate::models::User;
use crate::services::password::{check_user_password, hash_password, PasswordCheck};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/password/forgot", post(forgot_password))
        .route("/auth/password/reset", post(reset_password))
}

// ─── Session Cookies ─────────────────────────────────────────

/// Cookies are marked `Secure` only when the frontend is served over HTTPS.
fn cookies_secure(state: &AppState) -> bool {
    state.config.frontend_url.starts_with("https://")
}

fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::days(SESSION_DAYS))
        .build()
}

fn logged_in_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((LOGGED_IN_COOKIE, "1"))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::days(SESSION_DAYS))
        .build()
}

/// Issue a session for `user` and attach both cookies.
fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: &User,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let token = create_jwt(&user.email, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let secure = cookies_secure(state);
    let jar = jar
        .add(session_cookie(token.clone(), secure))
        .add(logged_in_cookie(secure));

    Ok((
        jar,
        Json(SessionResponse {
            token,
            email: user.email.clone(),
            name: user.name.clone(),
        }),
    ))
}

/// Session issued by register and login.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    /// Same JWT as the session cookie, for clients that send a Bearer header
    pub token: String,
    pub email: String,
    pub name: String,
}

/// Plain acknowledgement.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

// ─── Register / Login ────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Email không hợp lệ"))]
    email: String,
    #[validate(length(min = 6, message = "Mật khẩu phải có ít nhất 6 ký tự"))]
    password: String,
    confirm_password: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "Tên quá dài"))]
    name: Option<String>,
}

/// Create an account and log it in.
async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>)> {
    payload.email = normalize_email(&payload.email);
    payload.validate()?;

    if payload.password != payload.confirm_password {
        return Err(AppError::BadRequest("Mật khẩu không khớp".to_string()));
    }

    if state.db.get_user(&payload.email).await?.is_some() {
        return Err(AppError::Conflict("Email đã được đăng ký".to_string()));
    }

    let user = User {
        email: payload.email,
        name: payload
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or_default(),
        password_hash: Some(hash_password(&payload.password)?),
        password: None,
        uid: Some(new_avatar_uid()),
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };
    state.db.upsert_user(&user).await?;

    tracing::info!(email = %user.email, "Account registered");

    let (jar, body) = start_session(&state, jar, &user)?;
    Ok((StatusCode::CREATED, jar, body))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

/// Verify credentials and start a session.
///
/// Accounts still holding a plaintext password are re-hashed on success.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "Vui lòng nhập email và mật khẩu".to_string(),
        ));
    }
    if !email.validate_email() {
        return Err(AppError::BadRequest("Email không hợp lệ".to_string()));
    }

    let mut user = state
        .db
        .get_user(&email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    match check_user_password(&user, &payload.password) {
        PasswordCheck::Valid => {}
        PasswordCheck::ValidLegacy => {
            user.password_hash = Some(hash_password(&payload.password)?);
            user.password = None;
            state.db.upsert_user(&user).await?;
            tracing::info!(email = %email, "Upgraded plaintext password to hash");
        }
        PasswordCheck::Invalid => {
            tracing::warn!(email = %email, "Login rejected");
            return Err(AppError::InvalidCredentials);
        }
    }

    start_session(&state, jar, &user)
}

/// Clear both session cookies.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (StatusCode, CookieJar) {
    // Removal cookies must carry the attributes they were created with
    let secure = cookies_secure(&state);
    let jar = jar
        .remove(session_cookie(String::new(), secure))
        .remove(logged_in_cookie(secure));
    (StatusCode::NO_CONTENT, jar)
}

// ─── Password Reset ──────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Email không hợp lệ"))]
    email: String,
}

/// Email a one-time passcode to an existing account.
async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(mut payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    payload.email = normalize_email(&payload.email);
    payload.validate()?;

    state.reset_service.request_reset(&payload.email).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: format!("OTP đã được gửi tới {}", payload.email),
    }))
}

#[derive(Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Email không hợp lệ"))]
    email: String,
    otp: String,
    #[validate(length(min = 6, message = "Mật khẩu phải có ít nhất 6 ký tự"))]
    new_password: String,
    confirm_password: String,
}

/// Set a new password using an emailed passcode.
async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(mut payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    payload.email = normalize_email(&payload.email);
    payload.validate()?;

    if payload.new_password != payload.confirm_password {
        return Err(AppError::BadRequest("Mật khẩu không khớp".to_string()));
    }

    state
        .reset_service
        .reset_password(&payload.email, &payload.otp, &payload.new_password)
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Đặt lại mật khẩu thành công".to_string(),
    }))
}
