// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use danhba::error::AppError;
use serde_json::Value;

async fn render(err: AppError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_invalid_credentials_is_generic() {
    let (status, body) = render(AppError::InvalidCredentials).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");
    assert_eq!(body["message"], "Email hoặc mật khẩu không chính xác");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_permission_denied_has_specific_message() {
    let (status, body) = render(AppError::PermissionDenied("rules".to_string())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "permission_denied");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Quyền truy cập"));
    // Backend detail stays in the logs
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_internal_error_does_not_leak() {
    let (status, body) = render(AppError::Internal(anyhow::anyhow!("secret stack"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.to_string().contains("secret stack"));
}

#[tokio::test]
async fn test_client_errors_carry_details() {
    let (status, body) = render(AppError::Conflict("Email đã được đăng ký".to_string())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"], "Email đã được đăng ký");

    let (status, body) = render(AppError::NotFound("Không tìm thấy liên hệ x".to_string())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Không tìm thấy dữ liệu.");
}

#[tokio::test]
async fn test_database_error_is_500() {
    let (status, body) = render(AppError::Database("offline".to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
}
