// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for the signed-in account.

use crate::db::paths;
use crate::db::realtime::AvatarValue;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::user::new_avatar_uid;
use crate::models::User;
use crate::services::avatar::normalize_avatar;
use crate::services::password::{check_user_password, hash_password, PasswordCheck};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/me/avatar", put(put_avatar))
        .route("/api/me/password", put(change_password))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
    pub avatar_base64: Option<String>,
    pub created_at: String,
}

async fn load_user(state: &AppState, email: &str) -> Result<User> {
    state
        .db
        .get_user(email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Không tìm thấy tài khoản {}", email)))
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = load_user(&state, &user.email).await?;

    let avatar_base64 = match profile.uid.as_deref() {
        Some(uid) => state
            .realtime
            .get::<AvatarValue>(&paths::user_avatar(uid))
            .await?
            .map(|v| v.avatar_base64),
        None => None,
    };

    Ok(Json(UserResponse {
        email: profile.email,
        name: profile.name,
        avatar_base64,
        created_at: profile.created_at,
    }))
}

#[derive(Deserialize)]
pub struct AvatarRequest {
    avatar_base64: String,
}

/// Replace the account avatar.
///
/// Accounts created before avatars existed get a uid on first upload.
async fn put_avatar(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<AvatarRequest>,
) -> Result<StatusCode> {
    let avatar_base64 = normalize_avatar(&payload.avatar_base64)?;
    let mut profile = load_user(&state, &user.email).await?;

    let uid = match profile.uid.clone() {
        Some(uid) => uid,
        None => {
            let uid = new_avatar_uid();
            profile.uid = Some(uid.clone());
            state.db.upsert_user(&profile).await?;
            uid
        }
    };

    let value = AvatarValue {
        avatar_base64,
        email: Some(profile.email.clone()),
    };
    state.realtime.set(&paths::user_avatar(&uid), &value).await?;

    tracing::info!(email = %user.email, uid = %uid, "Avatar updated");
    Ok(StatusCode::NO_CONTENT)
}

// ─── Password ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct ChangePasswordRequest {
    current_password: String,
    #[validate(length(min = 6, message = "Mật khẩu phải có ít nhất 6 ký tự"))]
    new_password: String,
    confirm_password: String,
}

/// Change the password after re-checking the current one.
async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    payload.validate()?;
    if payload.new_password != payload.confirm_password {
        return Err(AppError::BadRequest("Mật khẩu không khớp".to_string()));
    }

    let mut profile = load_user(&state, &user.email).await?;
    if check_user_password(&profile, &payload.current_password) == PasswordCheck::Invalid {
        return Err(AppError::InvalidCredentials);
    }

    profile.password_hash = Some(hash_password(&payload.new_password)?);
    profile.password = None;
    state.db.upsert_user(&profile).await?;

    tracing::info!(email = %user.email, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}
