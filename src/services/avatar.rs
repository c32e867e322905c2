// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Avatar payload validation.

use crate::error::AppError;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Largest accepted avatar, decoded.
pub const MAX_AVATAR_BYTES: usize = 1024 * 1024;

const TOO_LARGE: &str = "Ảnh đại diện vượt quá 1 MiB";

/// Validate a base64 avatar and return it in canonical stored form.
///
/// A `data:image/...;base64,` prefix is accepted and stripped.
pub fn normalize_avatar(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    let payload = match trimmed.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:image/") => data,
        _ => trimmed,
    };

    if payload.is_empty() {
        return Err(AppError::BadRequest("Ảnh đại diện trống".to_string()));
    }

    // Cheap bound before decoding: 4 base64 chars carry 3 bytes
    if payload.len() / 4 * 3 > MAX_AVATAR_BYTES + 3 {
        return Err(AppError::BadRequest(TOO_LARGE.to_string()));
    }

    let bytes = STANDARD.decode(payload).map_err(|_| {
        AppError::BadRequest("Ảnh đại diện không đúng định dạng base64".to_string())
    })?;

    if bytes.len() > MAX_AVATAR_BYTES {
        return Err(AppError::BadRequest(TOO_LARGE.to_string()));
    }

    Ok(payload.to_string())
}

/// Normalize an optional avatar; blank input means no avatar.
pub fn normalize_optional_avatar(raw: Option<&str>) -> Result<Option<String>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => normalize_avatar(value).map(Some),
    }
}
