// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Address book routes.

use crate::db::paths;
use crate::db::realtime::AvatarValue;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::contact::new_document_id;
use crate::models::{Contact, Group};
use crate::services::avatar::normalize_optional_avatar;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/contacts", get(list_contacts).post(create_contact))
        .route(
            "/api/contacts/{id}",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
}

/// Contact as returned by the API.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ContactResponse {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub avatar_base64: Option<String>,
    pub group_id: Option<String>,
    /// Resolved group, detail view only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Group>,
}

impl From<Contact> for ContactResponse {
    fn from(c: Contact) -> Self {
        Self {
            id: c.id,
            name: c.name,
            phone: c.phone,
            email: c.email,
            avatar_base64: c.avatar_base64,
            group_id: c.group_id,
            group: None,
        }
    }
}

// ─── List ────────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct ListQuery {
    /// Name or phone fragment
    #[validate(length(max = 100, message = "Từ khóa quá dài"))]
    q: Option<String>,
}

/// Keep contacts matching `query` and sort them by name.
///
/// Name matches case-insensitively, phone as a plain substring.
fn filter_and_sort(contacts: Vec<Contact>, query: Option<&str>) -> Vec<Contact> {
    let needle = query.map(str::trim).unwrap_or_default().to_lowercase();

    let mut matched: Vec<Contact> = contacts
        .into_iter()
        .filter(|c| {
            needle.is_empty()
                || c.name.to_lowercase().contains(&needle)
                || c.phone.contains(&needle)
        })
        .collect();

    matched.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.phone.cmp(&b.phone))
    });
    matched
}

async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<ContactResponse>>> {
    params.validate()?;

    let contacts = state.db.list_contacts(&user.email).await?;
    let total = contacts.len();
    let contacts = filter_and_sort(contacts, params.q.as_deref());

    tracing::debug!(
        email = %user.email,
        total,
        matched = contacts.len(),
        "Listing contacts"
    );

    Ok(Json(contacts.into_iter().map(Into::into).collect()))
}

// ─── Detail ──────────────────────────────────────────────────

/// Contact with its group and mirrored avatar resolved.
async fn get_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ContactResponse>> {
    let contact = state
        .db
        .get_contact(&user.email, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Không tìm thấy liên hệ {}", id)))?;

    let group = match contact.group_id.as_deref() {
        Some(group_id) => state.db.get_group(&user.email, group_id).await?,
        None => None,
    };

    // The mirrored copy wins over the document field
    let mirrored = state
        .realtime
        .get::<AvatarValue>(&paths::contact_avatar(&contact.id))
        .await?
        .map(|v| v.avatar_base64);

    let mut response = ContactResponse::from(contact);
    response.avatar_base64 = mirrored.or(response.avatar_base64);
    response.group = group;
    Ok(Json(response))
}

// ─── Create / Update ─────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(max = 100, message = "Tên quá dài"))]
    name: String,
    #[validate(length(max = 30, message = "Số điện thoại quá dài"))]
    phone: String,
    #[serde(default)]
    #[validate(email(message = "Email không hợp lệ"))]
    email: Option<String>,
    #[serde(default)]
    avatar_base64: Option<String>,
    #[serde(default)]
    group_id: Option<String>,
}

impl ContactRequest {
    /// Trim every field; blank optionals become absent.
    fn normalize(&mut self) {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        self.name = self.name.trim().to_string();
        self.phone = self.phone.trim().to_string();
        self.email = blank_to_none(self.email.take());
        self.group_id = blank_to_none(self.group_id.take());
    }
}

/// Validate `payload` and turn it into the stored contact `id`.
async fn build_contact(
    state: &AppState,
    email: &str,
    id: String,
    mut payload: ContactRequest,
) -> Result<Contact> {
    payload.normalize();
    payload.validate()?;

    if payload.name.is_empty() || payload.phone.is_empty() {
        return Err(AppError::BadRequest(
            "Vui lòng nhập đầy đủ tên và số điện thoại".to_string(),
        ));
    }

    let avatar_base64 = normalize_optional_avatar(payload.avatar_base64.as_deref())?;

    if let Some(group_id) = payload.group_id.as_deref() {
        if state.db.get_group(email, group_id).await?.is_none() {
            return Err(AppError::BadRequest(format!(
                "Nhóm {} không tồn tại",
                group_id
            )));
        }
    }

    Ok(Contact {
        id,
        name: payload.name,
        phone: payload.phone,
        email: payload.email,
        avatar_base64,
        group_id: payload.group_id,
    })
}

/// Write or clear `contactAvatars/{id}` to match the contact.
async fn mirror_avatar(state: &AppState, contact: &Contact) -> Result<()> {
    let path = paths::contact_avatar(&contact.id);
    match &contact.avatar_base64 {
        Some(avatar) => {
            let value = AvatarValue {
                avatar_base64: avatar.clone(),
                email: None,
            };
            state.realtime.set(&path, &value).await
        }
        None => state.realtime.remove(&path).await,
    }
}

async fn create_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>)> {
    let contact = build_contact(&state, &user.email, new_document_id(), payload).await?;

    state.db.set_contact(&user.email, &contact).await?;
    if contact.avatar_base64.is_some() {
        mirror_avatar(&state, &contact).await?;
    }

    tracing::info!(email = %user.email, contact_id = %contact.id, "Contact created");
    Ok((StatusCode::CREATED, Json(contact.into())))
}

/// Overwrite a contact as a whole.
async fn update_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<ContactRequest>,
) -> Result<Json<ContactResponse>> {
    if state.db.get_contact(&user.email, &id).await?.is_none() {
        return Err(AppError::NotFound(format!("Không tìm thấy liên hệ {}", id)));
    }

    let contact = build_contact(&state, &user.email, id, payload).await?;
    state.db.set_contact(&user.email, &contact).await?;
    mirror_avatar(&state, &contact).await?;

    tracing::info!(email = %user.email, contact_id = %contact.id, "Contact updated");
    Ok(Json(contact.into()))
}

async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.db.delete_contact(&user.email, &id).await?;
    state.realtime.remove(&paths::contact_avatar(&id)).await?;

    tracing::info!(email = %user.email, contact_id = %id, "Contact deleted");
    Ok(StatusCode::NO_CONTENT)
}
