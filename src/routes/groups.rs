// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Group (color label) routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::contact::new_document_id;
use crate::models::group::{available_colors, is_hex_color, DEFAULT_GROUPS};
use crate::models::Group;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/groups", get(list_groups).post(create_group))
        .route("/api/groups/colors", get(list_colors))
        .route("/api/groups/{id}", delete(delete_group))
}

/// List groups, seeding the defaults for a user who has none.
async fn list_groups(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Group>>> {
    let groups = state.db.list_groups(&user.email).await?;
    if !groups.is_empty() {
        return Ok(Json(groups));
    }

    let mut seeded = Vec::with_capacity(DEFAULT_GROUPS.len());
    for (name, color) in DEFAULT_GROUPS {
        let group = Group {
            id: new_document_id(),
            name: name.to_string(),
            color: color.to_string(),
        };
        state.db.set_group(&user.email, &group).await?;
        seeded.push(group);
    }

    tracing::info!(email = %user.email, count = seeded.len(), "Seeded default groups");
    Ok(Json(seeded))
}

#[derive(Deserialize, Validate)]
pub struct GroupRequest {
    #[validate(length(min = 1, max = 50, message = "Tên nhóm không hợp lệ"))]
    name: String,
    color: String,
}

async fn create_group(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(mut payload): Json<GroupRequest>,
) -> Result<(StatusCode, Json<Group>)> {
    payload.name = payload.name.trim().to_string();
    payload.validate()?;

    let color = payload.color.trim().to_uppercase();
    if !is_hex_color(&color) {
        return Err(AppError::BadRequest(
            "Màu phải có dạng #RRGGBB".to_string(),
        ));
    }

    let group = Group {
        id: new_document_id(),
        name: payload.name,
        color,
    };
    state.db.set_group(&user.email, &group).await?;

    tracing::info!(email = %user.email, group_id = %group.id, "Group created");
    Ok((StatusCode::CREATED, Json(group)))
}

/// Delete a group and untag its contacts.
async fn delete_group(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    if state.db.get_group(&user.email, &id).await?.is_none() {
        return Err(AppError::NotFound(format!("Không tìm thấy nhóm {}", id)));
    }

    state.db.delete_group(&user.email, &id).await?;
    let untagged = state.db.untag_contacts(&user.email, &id).await?;

    tracing::info!(email = %user.email, group_id = %id, untagged, "Group deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Palette colors still free for a new group.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ColorsResponse {
    pub colors: Vec<String>,
}

async fn list_colors(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ColorsResponse>> {
    let groups = state.db.list_groups(&user.email).await?;
    Ok(Json(ColorsResponse {
        colors: available_colors(&groups)
            .into_iter()
            .map(String::from)
            .collect(),
    }))
}
