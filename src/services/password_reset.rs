// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password reset via emailed one-time passcode.
//!
//! A request stores a [`ResetToken`] (10-minute lifetime, 5 attempts) and
//! emails the code. A reset succeeds only with a matching code on a usable
//! token; the token is then deleted.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::contact::new_document_id;
use crate::models::ResetToken;
use crate::services::mailer::MailerService;
use crate::services::otp::{generate_otp, hash_otp, is_well_formed, otp_matches};
use crate::services::password::hash_password;
use chrono::{DateTime, Utc};

/// What to do with each stored token after a verification attempt.
#[derive(Debug, Default)]
pub struct Verification {
    /// Token whose code matched, if any
    pub matched: Option<String>,
    /// Tokens to write back with a bumped attempt count
    pub bump: Vec<ResetToken>,
    /// Expired or exhausted tokens to drop
    pub purge: Vec<String>,
}

/// Check `otp` against every token of `email`.
///
/// On a miss every usable token is charged one attempt.
pub fn verify_tokens(
    key: &[u8],
    email: &str,
    otp: &str,
    tokens: Vec<ResetToken>,
    now: DateTime<Utc>,
) -> Verification {
    let mut verification = Verification::default();
    let mut usable = Vec::new();

    for token in tokens {
        if !token.is_usable(now) {
            verification.purge.push(token.id);
        } else if verification.matched.is_none()
            && otp_matches(key, email, otp, &token.otp_hash)
        {
            verification.matched = Some(token.id);
        } else {
            usable.push(token);
        }
    }

    if verification.matched.is_none() {
        verification.bump = usable
            .into_iter()
            .map(|mut t| {
                t.attempt_count += 1;
                t
            })
            .collect();
    }

    verification
}

/// Password reset service.
#[derive(Clone)]
pub struct PasswordResetService {
    db: FirestoreDb,
    mailer: MailerService,
    otp_key: Vec<u8>,
}

impl PasswordResetService {
    pub fn new(db: FirestoreDb, mailer: MailerService, otp_key: Vec<u8>) -> Self {
        Self {
            db,
            mailer,
            otp_key,
        }
    }

    /// Issue and email a code for the account `email` (normalized).
    pub async fn request_reset(&self, email: &str) -> Result<(), AppError> {
        if self.db.get_user(email).await?.is_none() {
            return Err(AppError::NotFound(
                "Email không tồn tại trong hệ thống.".to_string(),
            ));
        }

        let otp = generate_otp();
        let token = ResetToken::new(
            new_document_id(),
            hash_otp(&self.otp_key, email, &otp)?,
            Utc::now(),
        );
        self.db.set_reset_token(email, &token).await?;
        self.mailer.send_otp(email, &otp).await?;

        tracing::info!(email = %email, token_id = %token.id, "Password reset OTP issued");
        Ok(())
    }

    /// Verify `otp` and overwrite the password on success.
    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let otp = otp.trim();
        if !is_well_formed(otp) {
            return Err(AppError::InvalidOtp);
        }

        let mut user = self
            .db
            .get_user(email)
            .await?
            .ok_or(AppError::InvalidOtp)?;

        let tokens = self.db.list_reset_tokens(email).await?;
        let verification = verify_tokens(&self.otp_key, email, otp, tokens, Utc::now());

        for id in &verification.purge {
            self.db.delete_reset_token(email, id).await?;
        }

        let Some(token_id) = verification.matched else {
            for token in &verification.bump {
                self.db.set_reset_token(email, token).await?;
            }
            tracing::warn!(
                email = %email,
                charged = verification.bump.len(),
                "Password reset OTP rejected"
            );
            return Err(AppError::InvalidOtp);
        };

        user.password_hash = Some(hash_password(new_password)?);
        user.password = None;
        self.db.upsert_user(&user).await?;
        self.db.delete_reset_token(email, &token_id).await?;

        tracing::info!(email = %email, "Password reset completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reset_token::{MAX_OTP_ATTEMPTS, OTP_TTL_MINUTES};
    use chrono::Duration;

    const KEY: &[u8] = b"test_jwt_key_32_bytes_minimum!!";
    const EMAIL: &str = "a@b.vn";

    fn token(id: &str, otp: &str, issued: DateTime<Utc>) -> ResetToken {
        ResetToken::new(
            id.to_string(),
            hash_otp(KEY, EMAIL, otp).unwrap(),
            issued,
        )
    }

    #[test]
    fn test_matching_code_is_accepted() {
        let now = Utc::now();
        let v = verify_tokens(KEY, EMAIL, "123456", vec![token("t1", "123456", now)], now);
        assert_eq!(v.matched.as_deref(), Some("t1"));
        assert!(v.bump.is_empty());
        assert!(v.purge.is_empty());
    }

    #[test]
    fn test_wrong_code_charges_usable_tokens() {
        let now = Utc::now();
        let v = verify_tokens(
            KEY,
            EMAIL,
            "999999",
            vec![token("t1", "123456", now), token("t2", "654321", now)],
            now,
        );
        assert!(v.matched.is_none());
        assert_eq!(v.bump.len(), 2);
        assert!(v.bump.iter().all(|t| t.attempt_count == 1));
    }

    #[test]
    fn test_expired_token_rejected_with_correct_code() {
        let issued = Utc::now() - Duration::minutes(OTP_TTL_MINUTES + 1);
        let v = verify_tokens(
            KEY,
            EMAIL,
            "123456",
            vec![token("t1", "123456", issued)],
            Utc::now(),
        );
        assert!(v.matched.is_none());
        assert_eq!(v.purge, vec!["t1".to_string()]);
        assert!(v.bump.is_empty());
    }

    #[test]
    fn test_exhausted_token_rejected_with_correct_code() {
        let now = Utc::now();
        let mut t = token("t1", "123456", now);
        t.attempt_count = MAX_OTP_ATTEMPTS;
        let v = verify_tokens(KEY, EMAIL, "123456", vec![t], now);
        assert!(v.matched.is_none());
        assert_eq!(v.purge, vec!["t1".to_string()]);
    }

    #[test]
    fn test_five_misses_exhaust_token() {
        let now = Utc::now();
        let mut tokens = vec![token("t1", "123456", now)];
        for _ in 0..MAX_OTP_ATTEMPTS {
            let v = verify_tokens(KEY, EMAIL, "000000", tokens, now);
            tokens = v.bump;
        }
        assert_eq!(tokens[0].attempt_count, MAX_OTP_ATTEMPTS);
        let v = verify_tokens(KEY, EMAIL, "123456", tokens, now);
        assert!(v.matched.is_none());
    }

    #[test]
    fn test_match_does_not_charge_other_tokens() {
        let now = Utc::now();
        let v = verify_tokens(
            KEY,
            EMAIL,
            "654321",
            vec![token("t1", "123456", now), token("t2", "654321", now)],
            now,
        );
        assert_eq!(v.matched.as_deref(), Some("t2"));
        assert!(v.bump.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_code_rejected_before_lookup() {
        let service = PasswordResetService::new(
            FirestoreDb::new_mock(),
            MailerService::new_mock(),
            KEY.to_vec(),
        );
        let err = service
            .reset_password(EMAIL, "12ab56", "newpass")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidOtp));
    }
}
