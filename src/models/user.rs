//! User model for storage and API.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Hex digits in an avatar uid.
const AVATAR_UID_LEN: usize = 15;

/// Account stored in Firestore under `users/{email}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Normalized email (also used as document ID)
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Argon2id PHC hash
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    /// Plaintext password written by older clients; upgraded on next login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Random identifier keying the user's own avatar (`avatars/{uid}`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// When the account was created (ISO 8601)
    #[serde(default)]
    pub created_at: String,
}

/// Normalize an email for use as a document ID.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Generate a random uid for `avatars/{uid}`.
pub fn new_avatar_uid() -> String {
    let mut rng = rand::thread_rng();
    (0..AVATAR_UID_LEN)
        .map(|_| char::from_digit(rng.gen_range(0..16), 16).unwrap_or('0'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Anh.Nguyen@Example.COM "), "anh.nguyen@example.com");
    }

    #[test]
    fn test_avatar_uid_shape() {
        let uid = new_avatar_uid();
        assert_eq!(uid.len(), 15);
        assert!(uid.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_legacy_document_deserializes() {
        let json = r#"{"email":"a@b.vn","password":"123456"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.password.as_deref(), Some("123456"));
        assert!(user.password_hash.is_none());
        assert!(user.uid.is_none());
        assert_eq!(user.name, "");
    }
}
