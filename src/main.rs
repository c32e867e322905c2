// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! DanhBa API Server
//!
//! Serves the personal address book, backup-code sharing and OTP password
//! reset for the DanhBa mobile app.

use danhba::{
    config::Config,
    db::{FirestoreDb, RealtimeDb},
    services::{BackupService, MailerService, PasswordResetService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting DanhBa API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    let realtime = RealtimeDb::new(&config.realtime_db_url, config.realtime_db_secret.clone());

    let mailer = MailerService::new(
        config.mailersend_api_key.clone(),
        config.sender_email.clone(),
        config.sender_name.clone(),
    );
    tracing::info!(sender = %config.sender_email, "Mailer initialized");

    let backup_service = BackupService::new(db.clone(), realtime.clone());
    let reset_service =
        PasswordResetService::new(db.clone(), mailer, config.jwt_signing_key.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        realtime,
        backup_service,
        reset_service,
    });

    // Build router
    let app = danhba::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("danhba=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
