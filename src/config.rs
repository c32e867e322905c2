// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Secrets are injected as environment variables by the deployment and read
//! once at startup.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Base URL of the realtime store, e.g. `https://<db>.firebasedatabase.app`
    pub realtime_db_url: String,
    /// Verified sender address for OTP emails
    pub sender_email: String,
    /// Display name for OTP emails
    pub sender_name: String,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes).
    /// Also keys the HMAC used to store OTP digests.
    pub jwt_signing_key: Vec<u8>,
    /// Realtime store database secret (legacy auth token), if rules require one
    pub realtime_db_secret: Option<String>,
    /// MailerSend API token
    pub mailersend_api_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            realtime_db_url: env::var("REALTIME_DB_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("REALTIME_DB_URL"))?,
            sender_email: env::var("VERIFIED_SENDER_EMAIL")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("VERIFIED_SENDER_EMAIL"))?,
            sender_name: env::var("MAIL_SENDER_NAME").unwrap_or_else(|_| "DanhBa App".to_string()),

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            realtime_db_secret: env::var("REALTIME_DB_SECRET")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            mailersend_api_key: env::var("MAILERSEND_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("MAILERSEND_API_KEY"))?,
        })
    }

    /// Fixed configuration for tests.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            realtime_db_url: "http://localhost:9000".to_string(),
            sender_email: "no-reply@example.com".to_string(),
            sender_name: "DanhBa App".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            realtime_db_secret: None,
            mailersend_api_key: String::new(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
