// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! DanhBa: personal address book with shareable contact backups
//!
//! This crate provides the backend API for managing contacts and groups,
//! publishing contact snapshots under short backup codes, merging shared
//! snapshots, and resetting passwords by emailed one-time passcode.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{FirestoreDb, RealtimeDb};
use services::{BackupService, PasswordResetService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub realtime: RealtimeDb,
    pub backup_service: BackupService,
    pub reset_service: PasswordResetService,
}
