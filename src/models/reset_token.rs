//! Password-reset one-time-passcode token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long an OTP stays valid.
pub const OTP_TTL_MINUTES: i64 = 10;

/// Verification attempts allowed per token.
pub const MAX_OTP_ATTEMPTS: u32 = 5;

/// Token stored under `users/{email}/resetTokens/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetToken {
    pub id: String,
    /// Hex HMAC-SHA256 of the OTP (see `services::otp`)
    pub otp_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub attempt_count: u32,
}

impl ResetToken {
    pub fn new(id: String, otp_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            otp_hash,
            created_at: now,
            expires_at: now + Duration::minutes(OTP_TTL_MINUTES),
            attempt_count: 0,
        }
    }

    /// Unexpired and not out of attempts.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at && self.attempt_count < MAX_OTP_ATTEMPTS
    }
}
