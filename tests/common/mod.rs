// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use danhba::config::Config;
use danhba::db::{FirestoreDb, RealtimeDb};
use danhba::routes::create_router;
use danhba::services::{BackupService, MailerService, PasswordResetService};
use danhba::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Build shared state around `config` with offline dependencies.
fn offline_state(config: Config) -> Arc<AppState> {
    let db = test_db_offline();
    let realtime = RealtimeDb::new_mock();
    let backup_service = BackupService::new(db.clone(), realtime.clone());
    let reset_service = PasswordResetService::new(
        db.clone(),
        MailerService::new_mock(),
        config.jwt_signing_key.clone(),
    );

    Arc::new(AppState {
        config,
        db,
        realtime,
        backup_service,
        reset_service,
    })
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = offline_state(Config::test_default());
    (create_router(state.clone()), state)
}

/// Same as [`create_test_app`] with a different frontend origin.
#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(frontend_url: &str) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.frontend_url = frontend_url.to_string();
    let state = offline_state(config);
    (create_router(state.clone()), state)
}

/// Create a session token the way the login route does.
#[allow(dead_code)]
pub fn create_test_jwt(email: &str, signing_key: &[u8]) -> String {
    danhba::middleware::auth::create_jwt(email, signing_key).expect("Failed to create JWT")
}
