// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Contact model for storage and API.

use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

/// Length of server-assigned document IDs (same shape as Firestore auto-IDs).
const DOCUMENT_ID_LEN: usize = 20;

/// Contact stored in Firestore under `users/{email}/contacts/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Document ID; absent from documents written by the mobile client
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    /// JPEG bytes, base64 encoded
    #[serde(default)]
    pub avatar_base64: Option<String>,
    /// Owning group, if tagged
    #[serde(default)]
    pub group_id: Option<String>,
}

impl Contact {
    pub fn key(&self) -> ContactKey {
        ContactKey::new(&self.name, &self.phone, self.email.as_deref())
    }
}

/// Composite identity used to detect duplicate contacts.
///
/// Name compares case-insensitively, phone and email exactly; a missing
/// email equals an empty one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContactKey {
    name: String,
    phone: String,
    email: String,
}

impl ContactKey {
    pub fn new(name: &str, phone: &str, email: Option<&str>) -> Self {
        Self {
            name: name.to_lowercase(),
            phone: phone.to_string(),
            email: email.unwrap_or_default().to_string(),
        }
    }
}

/// Generate a new random document ID.
pub fn new_document_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DOCUMENT_ID_LEN)
        .map(char::from)
        .collect()
}
