// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backup/share flow.
//!
//! Handles:
//! - Publishing a snapshot of the address book under a fresh backup code
//! - Listing the backup history with per-snapshot details
//! - Applying a code: fetching its snapshot and merging it into the caller's
//!   address book

use crate::db::realtime::AvatarValue;
use crate::db::{paths, FirestoreDb, RealtimeDb};
use crate::error::AppError;
use crate::models::contact::new_document_id;
use crate::models::{BackupCodeEntry, BackupRecord, Contact, SharedContact};
use crate::services::merge::plan_import;
use crate::services::share_code::{generate_code, is_valid_code};
use dashmap::DashMap;
use futures_util::{stream, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Fresh codes drawn before giving up on finding an unused one.
const MAX_CODE_ATTEMPTS: usize = 5;

/// Concurrent snapshot reads while building the history.
const MAX_CONCURRENT_READS: usize = 8;

/// Concurrent avatar writes after an import.
const MAX_CONCURRENT_WRITES: usize = 16;

/// Per-user import locks.
pub type ImportLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Which optional fields to put in a snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackupOptions {
    pub include_avatar: bool,
    pub include_email: bool,
}

/// Newly published backup.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BackupSummary {
    pub code: String,
    /// Epoch milliseconds
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub created_at: i64,
    pub contact_count: usize,
    pub included_fields: Vec<String>,
}

/// Outcome of applying a backup code.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ApplyResult {
    pub added: usize,
    pub skipped: usize,
    pub collapsed: usize,
    pub included_fields: Vec<String>,
}

/// Backup/share service.
#[derive(Clone)]
pub struct BackupService {
    db: FirestoreDb,
    realtime: RealtimeDb,
    import_locks: ImportLocks,
}

impl BackupService {
    pub fn new(db: FirestoreDb, realtime: RealtimeDb) -> Self {
        Self {
            db,
            realtime,
            import_locks: Arc::new(DashMap::new()),
        }
    }

    /// Publish a snapshot of `email`'s contacts under a new code.
    pub async fn create_backup(
        &self,
        email: &str,
        options: BackupOptions,
    ) -> Result<BackupSummary, AppError> {
        let contacts = self.db.list_contacts(email).await?;
        if contacts.is_empty() {
            return Err(AppError::BadRequest(
                "Bạn chưa có liên hệ nào để sao lưu".to_string(),
            ));
        }

        let BackupOptions {
            include_avatar,
            include_email,
        } = options;
        let record = BackupRecord {
            user_id: email.to_string(),
            contacts: contacts
                .iter()
                .map(|c| SharedContact::from_contact(c, include_avatar, include_email))
                .collect(),
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        let code = self.unused_code().await?;
        self.realtime
            .set(&paths::shared_contacts(&code), &record)
            .await?;

        let entry = BackupCodeEntry {
            code: code.clone(),
            created_at: record.created_at,
        };
        self.db.add_backup_code(email, &entry).await?;

        tracing::info!(
            email = %email,
            code = %code,
            contacts = record.contacts.len(),
            include_avatar = options.include_avatar,
            include_email = options.include_email,
            "Backup published"
        );

        Ok(BackupSummary {
            code,
            created_at: record.created_at,
            contact_count: record.contacts.len(),
            included_fields: to_strings(record.included_fields()),
        })
    }

    /// Draw codes until one is not already taken.
    ///
    /// The check and the later write are not atomic.
    async fn unused_code(&self) -> Result<String, AppError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_code();
            if !self.realtime.exists(&paths::shared_contacts(&code)).await? {
                return Ok(code);
            }
            tracing::warn!(attempt, "Backup code collision, drawing again");
        }
        Err(AppError::Internal(anyhow::anyhow!(
            "No unused backup code after {} attempts",
            MAX_CODE_ATTEMPTS
        )))
    }

    /// Most recent history entry.
    pub async fn latest_backup(&self, email: &str) -> Result<Option<BackupCodeEntry>, AppError> {
        Ok(self
            .db
            .list_backup_codes(email, Some(1))
            .await?
            .into_iter()
            .next())
    }

    /// History entries, newest first, with snapshot details.
    ///
    /// Entries whose snapshot is gone are left out.
    pub async fn history(&self, email: &str) -> Result<Vec<BackupSummary>, AppError> {
        let entries = self.db.list_backup_codes(email, None).await?;

        let items = stream::iter(entries)
            .map(|entry| async move {
                let record: Option<BackupRecord> = self
                    .realtime
                    .get(&paths::shared_contacts(&entry.code))
                    .await?;
                Ok::<_, AppError>(record.map(|r| BackupSummary {
                    code: entry.code,
                    created_at: entry.created_at,
                    contact_count: r.contacts.len(),
                    included_fields: to_strings(r.included_fields()),
                }))
            })
            .buffered(MAX_CONCURRENT_READS)
            .collect::<Vec<Result<Option<BackupSummary>, AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<Option<BackupSummary>>, AppError>>()?;

        Ok(items.into_iter().flatten().collect())
    }

    /// Merge the snapshot published under `code` into `email`'s contacts.
    pub async fn apply_code(&self, email: &str, code: &str) -> Result<ApplyResult, AppError> {
        let code = code.trim();
        if !is_valid_code(code) {
            return Err(AppError::BadRequest("Mã không hợp lệ".to_string()));
        }

        let record: BackupRecord = self
            .realtime
            .get(&paths::shared_contacts(code))
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Mã không hợp lệ hoặc không tồn tại".to_string())
            })?;

        let included_fields = to_strings(record.included_fields());

        // Serialize imports per account so a double submit cannot double-add
        let lock = self
            .import_locks
            .entry(email.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let existing = self.db.list_contacts(email).await?;
        let plan = plan_import(&existing, record.contacts);

        let new_contacts: Vec<Contact> = plan
            .to_add
            .into_iter()
            .map(|shared| Contact {
                id: new_document_id(),
                name: shared.name,
                phone: shared.phone,
                email: shared.email.filter(|e| !e.is_empty()),
                avatar_base64: shared.avatar_base64.filter(|a| !a.is_empty()),
                group_id: None,
            })
            .collect();

        self.db.batch_set_contacts(email, &new_contacts).await?;
        self.copy_avatars(&new_contacts).await?;

        tracing::info!(
            email = %email,
            code = %code,
            from = %record.user_id,
            added = new_contacts.len(),
            skipped = plan.skipped,
            collapsed = plan.collapsed,
            "Backup code applied"
        );

        Ok(ApplyResult {
            added: new_contacts.len(),
            skipped: plan.skipped,
            collapsed: plan.collapsed,
            included_fields,
        })
    }

    /// Mirror avatars of freshly imported contacts into `contactAvatars/`.
    async fn copy_avatars(&self, contacts: &[Contact]) -> Result<(), AppError> {
        let writes: Vec<(String, AvatarValue)> = contacts
            .iter()
            .filter_map(|contact| {
                let avatar = contact.avatar_base64.clone()?;
                let value = AvatarValue {
                    avatar_base64: avatar,
                    email: None,
                };
                Some((paths::contact_avatar(&contact.id), value))
            })
            .collect();

        stream::iter(writes)
            .map(|(path, value)| {
                let realtime = self.realtime.clone();
                async move { realtime.set(&path, &value).await }
            })
            .buffer_unordered(MAX_CONCURRENT_WRITES)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;
        Ok(())
    }
}

fn to_strings(fields: Vec<&'static str>) -> Vec<String> {
    fields.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_service() -> BackupService {
        BackupService::new(FirestoreDb::new_mock(), RealtimeDb::new_mock())
    }

    #[tokio::test]
    async fn test_apply_rejects_malformed_code() {
        let service = offline_service();
        let err = service.apply_code("a@b.vn", "NOT-A-CODE").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_apply_unknown_code_is_not_found() {
        let service = offline_service();
        let err = service.apply_code("a@b.vn", "zz99zz99").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_copy_avatars_writes_only_contacts_with_avatar() {
        let service = offline_service();
        let contacts = vec![
            Contact {
                id: "with".to_string(),
                name: "A".to_string(),
                phone: "1".to_string(),
                email: None,
                avatar_base64: Some("AAAA".to_string()),
                group_id: None,
            },
            Contact {
                id: "without".to_string(),
                name: "B".to_string(),
                phone: "2".to_string(),
                email: None,
                avatar_base64: None,
                group_id: None,
            },
        ];

        service.copy_avatars(&contacts).await.unwrap();

        let stored: AvatarValue = service
            .realtime
            .get(&paths::contact_avatar("with"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.avatar_base64, "AAAA");
        assert!(!service
            .realtime
            .exists(&paths::contact_avatar("without"))
            .await
            .unwrap());
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_apply_future_is_send() {
        // Handlers need Send futures to be routable
        let service = offline_service();
        let apply = service.apply_code("a@b.vn", "abcd1234");
        assert_send(&apply);
        let contacts: Vec<Contact> = Vec::new();
        let copy = service.copy_avatars(&contacts);
        assert_send(&copy);
    }

    #[tokio::test]
    async fn test_unused_code_is_well_formed() {
        let service = offline_service();
        let code = service.unused_code().await.unwrap();
        assert!(is_valid_code(&code));
    }
}
