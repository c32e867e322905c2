// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every error carries a static Vietnamese message meant to be shown to the
//! user as-is, next to a stable machine-readable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired OTP")]
    InvalidOtp,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Realtime store permission denied: {0}")]
    PermissionDenied(String),

    #[error("Realtime store error: {0}")]
    Realtime(String),

    #[error("Mail API error: {0}")]
    Mail(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Static user-facing message for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Unauthorized | AppError::InvalidToken => {
                "Không tìm thấy thông tin người dùng. Vui lòng đăng nhập lại."
            }
            AppError::InvalidCredentials => "Email hoặc mật khẩu không chính xác",
            AppError::InvalidOtp => "OTP không hợp lệ hoặc hết hạn",
            AppError::NotFound(_) => "Không tìm thấy dữ liệu.",
            AppError::BadRequest(_) => "Dữ liệu không hợp lệ.",
            AppError::Conflict(_) => "Dữ liệu đã tồn tại.",
            AppError::PermissionDenied(_) => {
                "Quyền truy cập Realtime Database bị từ chối. Vui lòng kiểm tra quy tắc bảo mật."
            }
            AppError::Mail(_) => "Không thể gửi email. Vui lòng thử lại sau.",
            AppError::Realtime(_) | AppError::Database(_) | AppError::Internal(_) => {
                "Đã xảy ra lỗi. Vui lòng kiểm tra kết nối và thử lại."
            }
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "invalid_credentials", None)
            }
            AppError::InvalidOtp => (StatusCode::BAD_REQUEST, "invalid_otp", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg.clone())),
            AppError::PermissionDenied(msg) => {
                tracing::error!(error = %msg, "Realtime store permission denied");
                (StatusCode::BAD_GATEWAY, "permission_denied", None)
            }
            AppError::Realtime(msg) => {
                tracing::error!(error = %msg, "Realtime store error");
                (StatusCode::BAD_GATEWAY, "realtime_error", None)
            }
            AppError::Mail(msg) => {
                tracing::error!(error = %msg, "Mail API error");
                (StatusCode::BAD_GATEWAY, "mail_error", None)
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            message: self.user_message().to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

/// Convert `validator` failures into a 400 with the field messages.
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}
