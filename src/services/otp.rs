//! One-time passcodes for password reset.
//!
//! Codes are six decimal digits without a leading zero. Only an
//! HMAC-SHA256 digest bound to the account email is ever stored.

use crate::error::AppError;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const OTP_LEN: usize = 6;

/// Draw a code uniformly from `100000..=999999`.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999u32).to_string()
}

/// Hex digest stored in place of the code.
pub fn hash_otp(key: &[u8], email: &str, otp: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(b"otp:");
    mac.update(email.as_bytes());
    mac.update(b":");
    mac.update(otp.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Compare `otp` against a stored digest in constant time.
pub fn otp_matches(key: &[u8], email: &str, otp: &str, stored_hash: &str) -> bool {
    let Ok(candidate) = hash_otp(key, email, otp) else {
        return false;
    };
    candidate.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

/// Shape check before any lookup.
pub fn is_well_formed(otp: &str) -> bool {
    otp.len() == OTP_LEN && otp.bytes().all(|b| b.is_ascii_digit())
}
