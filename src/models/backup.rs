// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Shared contact snapshots and the per-user backup history.

use crate::models::{Contact, ContactKey};
use serde::{Deserialize, Serialize};

/// Snapshot stored in the realtime store under `sharedContacts/{code}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRecord {
    /// Email of the account that created the snapshot
    pub user_id: String,
    #[serde(default)]
    pub contacts: Vec<SharedContact>,
    /// Epoch milliseconds
    pub created_at: i64,
}

impl BackupRecord {
    pub fn has_avatars(&self) -> bool {
        self.contacts.iter().any(|c| c.avatar_base64.is_some())
    }

    pub fn has_emails(&self) -> bool {
        self.contacts
            .iter()
            .any(|c| c.email.as_deref().is_some_and(|e| !e.is_empty()))
    }

    /// Field labels carried by this snapshot, for display.
    pub fn included_fields(&self) -> Vec<&'static str> {
        let mut fields = vec!["name", "phone"];
        if self.has_avatars() {
            fields.push("avatar");
        }
        if self.has_emails() {
            fields.push("email");
        }
        fields
    }
}

/// Contact as it travels inside a snapshot (no group tagging).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedContact {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_base64: Option<String>,
}

impl SharedContact {
    /// Project a stored contact into a snapshot entry, keeping optional
    /// fields only when requested.
    pub fn from_contact(contact: &Contact, include_avatar: bool, include_email: bool) -> Self {
        Self {
            id: contact.id.clone(),
            name: contact.name.clone(),
            phone: contact.phone.clone(),
            email: contact
                .email
                .clone()
                .filter(|e| include_email && !e.is_empty()),
            avatar_base64: contact
                .avatar_base64
                .clone()
                .filter(|a| include_avatar && !a.is_empty()),
        }
    }

    pub fn key(&self) -> ContactKey {
        ContactKey::new(&self.name, &self.phone, self.email.as_deref())
    }
}

/// History entry stored under `users/{email}/backupCodes/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupCodeEntry {
    pub code: String,
    /// Epoch milliseconds
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(email: Option<&str>, avatar: Option<&str>) -> Contact {
        Contact {
            id: "c1".to_string(),
            name: "Bình".to_string(),
            phone: "0909".to_string(),
            email: email.map(String::from),
            avatar_base64: avatar.map(String::from),
            group_id: Some("g1".to_string()),
        }
    }

    #[test]
    fn test_from_contact_drops_unrequested_fields() {
        let c = stored(Some("b@x.vn"), Some("AAAA"));
        let shared = SharedContact::from_contact(&c, false, false);
        assert_eq!(shared.email, None);
        assert_eq!(shared.avatar_base64, None);

        let shared = SharedContact::from_contact(&c, true, true);
        assert_eq!(shared.email.as_deref(), Some("b@x.vn"));
        assert_eq!(shared.avatar_base64.as_deref(), Some("AAAA"));
    }

    #[test]
    fn test_included_fields() {
        let record = BackupRecord {
            user_id: "a@b.vn".to_string(),
            contacts: vec![SharedContact::from_contact(
                &stored(Some("b@x.vn"), None),
                true,
                true,
            )],
            created_at: 0,
        };
        assert_eq!(record.included_fields(), vec!["name", "phone", "email"]);
    }

    #[test]
    fn test_record_wire_format() {
        let json = r#"{"userId":"a@b.vn","createdAt":1717000000000,
            "contacts":[{"id":"x","name":"An","phone":"01","avatarBase64":"AA"}]}"#;
        let record: BackupRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.contacts.len(), 1);
        assert!(record.has_avatars());
        assert!(!record.has_emails());
    }
}
