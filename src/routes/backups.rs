// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backup/share routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::services::qr::render_svg;
use crate::services::share_code::is_valid_code;
use crate::services::{ApplyResult, BackupOptions, BackupSummary};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/backups", get(list_backups).post(create_backup))
        .route("/api/backups/latest", get(latest_backup))
        .route("/api/backups/apply", post(apply_backup))
        .route("/api/backups/{code}/qr", get(backup_qr))
}

async fn list_backups(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<BackupSummary>>> {
    Ok(Json(state.backup_service.history(&user.email).await?))
}

#[derive(Deserialize)]
pub struct CreateBackupRequest {
    #[serde(default)]
    include_avatar: bool,
    #[serde(default)]
    include_email: bool,
}

/// Publish the caller's address book under a new code.
async fn create_backup(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateBackupRequest>,
) -> Result<(StatusCode, Json<BackupSummary>)> {
    let options = BackupOptions {
        include_avatar: payload.include_avatar,
        include_email: payload.include_email,
    };
    let summary = state
        .backup_service
        .create_backup(&user.email, options)
        .await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Most recently published code.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LatestBackupResponse {
    pub code: String,
    /// Epoch milliseconds
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub created_at: i64,
    /// `created_at` as RFC 3339
    pub created_at_iso: Option<String>,
}

async fn latest_backup(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Option<LatestBackupResponse>>> {
    let latest = state.backup_service.latest_backup(&user.email).await?;
    Ok(Json(latest.map(|entry| LatestBackupResponse {
        created_at_iso: crate::time_utils::format_millis_rfc3339(entry.created_at),
        code: entry.code,
        created_at: entry.created_at,
    })))
}

#[derive(Deserialize)]
pub struct ApplyBackupRequest {
    code: String,
}

/// Merge another user's snapshot into the caller's address book.
async fn apply_backup(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ApplyBackupRequest>,
) -> Result<Json<ApplyResult>> {
    let result = state
        .backup_service
        .apply_code(&user.email, &payload.code)
        .await?;
    Ok(Json(result))
}

/// QR image encoding the code string.
async fn backup_qr(Path(code): Path<String>) -> Result<impl IntoResponse> {
    if !is_valid_code(&code) {
        return Err(AppError::BadRequest("Mã không hợp lệ".to_string()));
    }

    let svg = render_svg(&code)?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            // Snapshots are immutable once written
            (header::CACHE_CONTROL, "private, max-age=86400"),
        ],
        svg,
    ))
}
