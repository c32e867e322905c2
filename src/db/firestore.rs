// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Everything but the account document lives in sub-collections of
//! `users/{email}`:
//! - Contacts
//! - Groups
//! - Backup codes (history)
//! - Reset tokens (OTP)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{BackupCodeEntry, Contact, Group, ResetToken, User};
use serde::Deserialize;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Documents whose ID is their Firestore document name.
///
/// Contacts and groups created by older clients carry no `id` field.
trait Named {
    fn set_document_id(&mut self, id: String);
}

impl Named for Contact {
    fn set_document_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Named for Group {
    fn set_document_id(&mut self, id: String) {
        self.id = id;
    }
}

/// A document as read, with the name the firestore crate injects.
#[derive(Deserialize)]
struct StoredDoc<T> {
    #[serde(rename = "_firestore_id", default)]
    document_id: Option<String>,
    #[serde(flatten)]
    doc: T,
}

impl<T: Named> StoredDoc<T> {
    fn into_doc(self) -> T {
        let mut doc = self.doc;
        if let Some(id) = self.document_id {
            doc.set_document_id(id);
        }
        doc
    }
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Parent path `users/{email}` for the per-user sub-collections.
    fn user_path(&self, email: &str) -> Result<firestore::ParentPathBuilder, AppError> {
        self.get_client()?
            .parent_path(collections::USERS, email)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by normalized email.
    pub async fn get_user(&self, email: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(email)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.email)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Contact Operations ──────────────────────────────────────

    /// All contacts of a user, in storage order.
    pub async fn list_contacts(&self, email: &str) -> Result<Vec<Contact>, AppError> {
        let parent = self.user_path(email)?;
        let docs = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::CONTACTS)
            .parent(&parent)
            .obj::<StoredDoc<Contact>>()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(docs.into_iter().map(StoredDoc::into_doc).collect())
    }

    pub async fn get_contact(&self, email: &str, id: &str) -> Result<Option<Contact>, AppError> {
        let parent = self.user_path(email)?;
        let doc = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CONTACTS)
            .parent(&parent)
            .obj::<StoredDoc<Contact>>()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(doc.map(StoredDoc::into_doc))
    }

    /// Create or overwrite a contact (document ID = `contact.id`).
    pub async fn set_contact(&self, email: &str, contact: &Contact) -> Result<(), AppError> {
        let parent = self.user_path(email)?;
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CONTACTS)
            .document_id(&contact.id)
            .parent(&parent)
            .object(contact)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn delete_contact(&self, email: &str, id: &str) -> Result<(), AppError> {
        let parent = self.user_path(email)?;
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::CONTACTS)
            .document_id(id)
            .parent(&parent)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Write many contacts, committing one transaction per chunk.
    pub async fn batch_set_contacts(
        &self,
        email: &str,
        contacts: &[Contact],
    ) -> Result<(), AppError> {
        let client = self.get_client()?;
        let parent = self.user_path(email)?;

        for chunk in contacts.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for contact in chunk {
                client
                    .fluent()
                    .update()
                    .in_col(collections::CONTACTS)
                    .document_id(&contact.id)
                    .parent(&parent)
                    .object(contact)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add contact to transaction: {}",
                            e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit contact batch: {}", e))
            })?;
        }

        Ok(())
    }

    /// Clear `groupId` on every contact tagged with `group_id`.
    ///
    /// Returns the number of contacts updated.
    pub async fn untag_contacts(&self, email: &str, group_id: &str) -> Result<usize, AppError> {
        let parent = self.user_path(email)?;
        let group_id = group_id.to_string();
        let tagged: Vec<StoredDoc<Contact>> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::CONTACTS)
            .parent(&parent)
            .filter(move |q| q.for_all([q.field("groupId").eq(group_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let untagged: Vec<Contact> = tagged
            .into_iter()
            .map(StoredDoc::into_doc)
            .map(|mut c| {
                c.group_id = None;
                c
            })
            .collect();

        self.batch_set_contacts(email, &untagged).await?;
        Ok(untagged.len())
    }

    // ─── Group Operations ────────────────────────────────────────

    pub async fn list_groups(&self, email: &str) -> Result<Vec<Group>, AppError> {
        let parent = self.user_path(email)?;
        let docs = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::GROUPS)
            .parent(&parent)
            .obj::<StoredDoc<Group>>()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(docs.into_iter().map(StoredDoc::into_doc).collect())
    }

    pub async fn get_group(&self, email: &str, id: &str) -> Result<Option<Group>, AppError> {
        let parent = self.user_path(email)?;
        let doc = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::GROUPS)
            .parent(&parent)
            .obj::<StoredDoc<Group>>()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(doc.map(StoredDoc::into_doc))
    }

    pub async fn set_group(&self, email: &str, group: &Group) -> Result<(), AppError> {
        let parent = self.user_path(email)?;
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::GROUPS)
            .document_id(&group.id)
            .parent(&parent)
            .object(group)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn delete_group(&self, email: &str, id: &str) -> Result<(), AppError> {
        let parent = self.user_path(email)?;
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::GROUPS)
            .document_id(id)
            .parent(&parent)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Backup History Operations ───────────────────────────────

    /// Append a history entry (document ID = code).
    pub async fn add_backup_code(
        &self,
        email: &str,
        entry: &BackupCodeEntry,
    ) -> Result<(), AppError> {
        let parent = self.user_path(email)?;
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::BACKUP_CODES)
            .document_id(&entry.code)
            .parent(&parent)
            .object(entry)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// History entries, newest first.
    pub async fn list_backup_codes(
        &self,
        email: &str,
        limit: Option<u32>,
    ) -> Result<Vec<BackupCodeEntry>, AppError> {
        let parent = self.user_path(email)?;
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::BACKUP_CODES)
            .parent(&parent)
            .order_by([("createdAt", firestore::FirestoreQueryDirection::Descending)]);

        let query = match limit {
            Some(limit) => query.limit(limit),
            None => query,
        };

        query
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Reset Token Operations ──────────────────────────────────

    pub async fn list_reset_tokens(&self, email: &str) -> Result<Vec<ResetToken>, AppError> {
        let parent = self.user_path(email)?;
        self.get_client()?
            .fluent()
            .select()
            .from(collections::RESET_TOKENS)
            .parent(&parent)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_reset_token(&self, email: &str, token: &ResetToken) -> Result<(), AppError> {
        let parent = self.user_path(email)?;
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::RESET_TOKENS)
            .document_id(&token.id)
            .parent(&parent)
            .object(token)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn delete_reset_token(&self, email: &str, id: &str) -> Result<(), AppError> {
        let parent = self.user_path(email)?;
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::RESET_TOKENS)
            .document_id(id)
            .parent(&parent)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
