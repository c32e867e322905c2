//! Database layer (Firestore documents, realtime-store key/values).

pub mod firestore;
pub mod realtime;

pub use firestore::FirestoreDb;
pub use realtime::RealtimeDb;

/// Collection names as constants.
pub mod collections {
    /// Accounts, keyed by normalized email
    pub const USERS: &str = "users";
    // Sub-collections under `users/{email}`
    pub const CONTACTS: &str = "contacts";
    pub const GROUPS: &str = "groups";
    pub const BACKUP_CODES: &str = "backupCodes";
    pub const RESET_TOKENS: &str = "resetTokens";
}

/// Realtime-store path builders.
pub mod paths {
    /// The user's own avatar.
    pub fn user_avatar(uid: &str) -> String {
        format!("avatars/{}", urlencoding::encode(uid))
    }

    pub fn contact_avatar(contact_id: &str) -> String {
        format!("contactAvatars/{}", urlencoding::encode(contact_id))
    }

    /// Snapshot published under a backup code.
    pub fn shared_contacts(code: &str) -> String {
        format!("sharedContacts/{}", urlencoding::encode(code))
    }
}
