// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transactional email client (MailerSend API).
//!
//! Only one message is ever sent: the password-reset OTP.

use crate::error::AppError;
use crate::models::reset_token::OTP_TTL_MINUTES;
use chrono::Datelike;
use serde::Serialize;

const MAILERSEND_API_URL: &str = "https://api.mailersend.com/v1/email";

/// MailerSend client.
#[derive(Clone)]
pub struct MailerService {
    http: reqwest::Client,
    api_url: String,
    /// `None` in offline mode; sends fail
    api_key: Option<String>,
    sender_email: String,
    sender_name: String,
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct EmailRequest<'a> {
    from: Address<'a>,
    to: Vec<Address<'a>>,
    subject: &'a str,
    html: String,
}

impl MailerService {
    pub fn new(api_key: String, sender_email: String, sender_name: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: MAILERSEND_API_URL.to_string(),
            api_key: Some(api_key).filter(|k| !k.is_empty()),
            sender_email,
            sender_name,
        }
    }

    /// Create a mailer that refuses to send (offline mode).
    pub fn new_mock() -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: MAILERSEND_API_URL.to_string(),
            api_key: None,
            sender_email: "no-reply@example.com".to_string(),
            sender_name: "DanhBa App".to_string(),
        }
    }

    /// Email a password-reset OTP to `to`.
    pub async fn send_otp(&self, to: &str, otp: &str) -> Result<(), AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Mail("Mailer not configured (offline mode)".to_string()))?;

        let request = EmailRequest {
            from: Address {
                email: &self.sender_email,
                name: Some(&self.sender_name),
            },
            to: vec![Address {
                email: to,
                name: None,
            }],
            subject: "Mã OTP đặt lại mật khẩu - DanhBa App",
            html: render_otp_html(otp, chrono::Utc::now().year()),
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Mail(format!("Send request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Mail(format!("HTTP {}: {}", status, body)));
        }

        tracing::info!(to = %to, "OTP email sent");
        Ok(())
    }
}

/// HTML body of the OTP email.
fn render_otp_html(otp: &str, year: i32) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: auto; border: 1px solid #e0e0e0; padding: 20px; border-radius: 10px; background-color: #f9f9f9;">
  <h2 style="color: #2c3e50;">Đặt lại mật khẩu</h2>
  <p>Xin chào,</p>
  <p>Bạn vừa yêu cầu đặt lại mật khẩu cho tài khoản tại <strong>DanhBa App</strong>.</p>
  <p>Mã xác thực (OTP) của bạn là:</p>
  <div style="text-align: center; margin: 20px 0;">
    <span style="font-size: 32px; font-weight: bold; letter-spacing: 4px; color: #1abc9c;">{otp}</span>
  </div>
  <p>Mã OTP có hiệu lực trong vòng <strong>{ttl} phút</strong>. Nếu bạn không yêu cầu, hãy bỏ qua email này.</p>
  <hr style="margin: 30px 0;" />
  <p style="font-size: 12px; color: #7f8c8d;">© {year} DanhBa App. All rights reserved.</p>
</div>"#,
        otp = otp,
        ttl = OTP_TTL_MINUTES,
        year = year,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_html_contains_code_and_ttl() {
        let html = render_otp_html("482913", 2026);
        assert!(html.contains("482913"));
        assert!(html.contains("10 phút"));
        assert!(html.contains("© 2026"));
    }

    #[test]
    fn test_request_wire_format() {
        let request = EmailRequest {
            from: Address {
                email: "no-reply@example.com",
                name: Some("DanhBa App"),
            },
            to: vec![Address {
                email: "a@b.vn",
                name: None,
            }],
            subject: "s",
            html: "h".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["from"]["name"], "DanhBa App");
        assert_eq!(value["to"][0]["email"], "a@b.vn");
        assert!(value["to"][0].get("name").is_none());
    }

    #[tokio::test]
    async fn test_offline_mailer_refuses() {
        let mailer = MailerService::new_mock();
        let err = mailer.send_otp("a@b.vn", "123456").await.unwrap_err();
        assert!(matches!(err, AppError::Mail(_)));
    }
}
