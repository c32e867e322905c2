// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (`FIRESTORE_EMULATOR_HOST`); they are skipped otherwise.
//!
//! Each test works under its own freshly generated account email.

use chrono::{Duration, Utc};
use danhba::db::{paths, RealtimeDb};
use danhba::models::contact::new_document_id;
use danhba::models::{BackupCodeEntry, Contact, Group, ResetToken, User};
use danhba::error::AppError;
use danhba::services::otp::hash_otp;
use danhba::services::password::verify_password;
use danhba::services::{BackupOptions, BackupService, MailerService, PasswordResetService};

mod common;
use common::test_db;

/// Generate a unique account email for test isolation.
fn unique_email() -> String {
    format!("test-{}@example.vn", new_document_id().to_lowercase())
}

fn contact(name: &str, phone: &str, email: Option<&str>) -> Contact {
    Contact {
        id: new_document_id(),
        name: name.to_string(),
        phone: phone.to_string(),
        email: email.map(String::from),
        avatar_base64: None,
        group_id: None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_round_trip() {
    require_emulator!();

    let db = test_db().await;
    let email = unique_email();

    assert!(db.get_user(&email).await.unwrap().is_none());

    let user = User {
        email: email.clone(),
        name: "Nguyễn An".to_string(),
        password_hash: None,
        password: Some("123456".to_string()),
        uid: Some("0123456789abcde".to_string()),
        created_at: "2024-01-15T10:00:00Z".to_string(),
    };
    db.upsert_user(&user).await.unwrap();

    let fetched = db.get_user(&email).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Nguyễn An");
    assert_eq!(fetched.password.as_deref(), Some("123456"));
    assert_eq!(fetched.uid.as_deref(), Some("0123456789abcde"));
}

// ═══════════════════════════════════════════════════════════════════════════
// CONTACT & GROUP TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_contact_crud() {
    require_emulator!();

    let db = test_db().await;
    let email = unique_email();

    let mut c = contact("An", "0123", Some("an@example.vn"));
    db.set_contact(&email, &c).await.unwrap();
    assert_eq!(db.get_contact(&email, &c.id).await.unwrap(), Some(c.clone()));

    c.phone = "0999".to_string();
    db.set_contact(&email, &c).await.unwrap();
    let listed = db.list_contacts(&email).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].phone, "0999");

    db.delete_contact(&email, &c.id).await.unwrap();
    assert!(db.get_contact(&email, &c.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_group_untags_contacts() {
    require_emulator!();

    let db = test_db().await;
    let email = unique_email();

    let group = Group {
        id: new_document_id(),
        name: "Gia đình".to_string(),
        color: "#FF0000".to_string(),
    };
    db.set_group(&email, &group).await.unwrap();

    let mut tagged = contact("An", "1", None);
    tagged.group_id = Some(group.id.clone());
    let untagged = contact("Bình", "2", None);
    db.batch_set_contacts(&email, &[tagged.clone(), untagged])
        .await
        .unwrap();

    db.delete_group(&email, &group.id).await.unwrap();
    let cleared = db.untag_contacts(&email, &group.id).await.unwrap();
    assert_eq!(cleared, 1);

    let after = db.get_contact(&email, &tagged.id).await.unwrap().unwrap();
    assert_eq!(after.group_id, None);
    assert!(db.get_group(&email, &group.id).await.unwrap().is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// BACKUP TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_backup_codes_newest_first() {
    require_emulator!();

    let db = test_db().await;
    let email = unique_email();

    for (code, created_at) in [("aaaa1111", 1_000), ("cccc3333", 3_000), ("bbbb2222", 2_000)] {
        let entry = BackupCodeEntry {
            code: code.to_string(),
            created_at,
        };
        db.add_backup_code(&email, &entry).await.unwrap();
    }

    let all = db.list_backup_codes(&email, None).await.unwrap();
    let codes: Vec<&str> = all.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, vec!["cccc3333", "bbbb2222", "aaaa1111"]);

    let latest = db.list_backup_codes(&email, Some(1)).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].code, "cccc3333");
}

#[tokio::test]
async fn test_backup_and_apply_between_accounts() {
    require_emulator!();

    let db = test_db().await;
    let realtime = RealtimeDb::new_mock();
    let service = BackupService::new(db.clone(), realtime.clone());

    let sender = unique_email();
    let receiver = unique_email();

    let mut with_avatar = contact("Anh", "0123", None);
    with_avatar.avatar_base64 = Some("AAAA".to_string());
    db.batch_set_contacts(
        &sender,
        &[with_avatar, contact("Bình", "0456", Some("binh@example.vn"))],
    )
    .await
    .unwrap();

    // Same key as the sender's Anh: name compares case-insensitively
    db.set_contact(&receiver, &contact("anh", "0123", None))
        .await
        .unwrap();

    let options = BackupOptions {
        include_avatar: true,
        include_email: false,
    };
    let summary = service.create_backup(&sender, options).await.unwrap();
    assert_eq!(summary.contact_count, 2);
    assert_eq!(summary.included_fields, vec!["name", "phone", "avatar"]);

    let history = service.history(&sender).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].code, summary.code);

    let result = service.apply_code(&receiver, &summary.code).await.unwrap();
    assert_eq!(result.added, 1);
    assert_eq!(result.skipped, 1);

    let contacts = db.list_contacts(&receiver).await.unwrap();
    assert_eq!(contacts.len(), 2);
    let binh = contacts.iter().find(|c| c.name == "Bình").unwrap();
    assert_eq!(binh.email, None);

    // Applying again adds nothing
    let again = service.apply_code(&receiver, &summary.code).await.unwrap();
    assert_eq!(again.added, 0);
    assert_eq!(again.skipped, 2);

    // Snapshot stays in place after being applied
    assert!(realtime
        .exists(&paths::shared_contacts(&summary.code))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_history_skips_missing_snapshots() {
    require_emulator!();

    let db = test_db().await;
    let service = BackupService::new(db.clone(), RealtimeDb::new_mock());
    let email = unique_email();

    let entry = BackupCodeEntry {
        code: "gone0000".to_string(),
        created_at: Utc::now().timestamp_millis(),
    };
    db.add_backup_code(&email, &entry).await.unwrap();

    assert!(service.history(&email).await.unwrap().is_empty());
    assert_eq!(
        service.latest_backup(&email).await.unwrap().unwrap().code,
        "gone0000"
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// RESET TOKEN TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_reset_token_lifecycle() {
    require_emulator!();

    let db = test_db().await;
    let email = unique_email();

    let issued = Utc::now() - Duration::minutes(2);
    let mut token = ResetToken::new(new_document_id(), "digest".to_string(), issued);
    db.set_reset_token(&email, &token).await.unwrap();

    token.attempt_count = 3;
    db.set_reset_token(&email, &token).await.unwrap();

    let stored = db.list_reset_tokens(&email).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].attempt_count, 3);
    assert_eq!(stored[0].expires_at.timestamp(), token.expires_at.timestamp());

    db.delete_reset_token(&email, &token.id).await.unwrap();
    assert!(db.list_reset_tokens(&email).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reset_password_charges_then_consumes_token() {
    require_emulator!();

    const OTP_KEY: &[u8] = b"test_otp_key_32_bytes_minimum!!!";

    let db = test_db().await;
    let service =
        PasswordResetService::new(db.clone(), MailerService::new_mock(), OTP_KEY.to_vec());
    let email = unique_email();

    let user = User {
        email: email.clone(),
        name: "Trần Bình".to_string(),
        password_hash: None,
        password: Some("cu123456".to_string()),
        uid: None,
        created_at: "2024-01-15T10:00:00Z".to_string(),
    };
    db.upsert_user(&user).await.unwrap();

    let token = ResetToken::new(
        new_document_id(),
        hash_otp(OTP_KEY, &email, "482913").unwrap(),
        Utc::now(),
    );
    db.set_reset_token(&email, &token).await.unwrap();

    // A wrong code is charged to the stored token
    let err = service
        .reset_password(&email, "000000", "moi123456")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidOtp));
    let stored = db.list_reset_tokens(&email).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].attempt_count, 1);

    service
        .reset_password(&email, "482913", "moi123456")
        .await
        .unwrap();
    assert!(db.list_reset_tokens(&email).await.unwrap().is_empty());

    let updated = db.get_user(&email).await.unwrap().unwrap();
    assert_eq!(updated.password, None);
    assert!(verify_password(
        "moi123456",
        updated.password_hash.as_deref().unwrap()
    ));

    // The code works only once
    let err = service
        .reset_password(&email, "482913", "khac123456")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidOtp));
}
